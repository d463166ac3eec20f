//! Wallet commands: `create`, `import` and `export`.

use std::path::Path;

use walletkeep_wallet::WalletRecord;
use zeroize::Zeroizing;

use super::build_controller;
use crate::login::read_password;
use crate::output;
use crate::GlobalOpts;

/// Creates and persists a wallet from a generated or supplied phrase.
pub async fn create(
    name: &str,
    address_type: Option<&str>,
    mnemonic_file: Option<&Path>,
    opts: &GlobalOpts,
) -> std::result::Result<(), String> {
    let controller = build_controller(opts).await?;
    let mut session = controller.new_session();
    session
        .set_details(name, address_type.unwrap_or_default())
        .map_err(|e| e.to_string())?;

    match mnemonic_file {
        Some(path) => {
            let phrase = read_secret_file(path)?;
            controller
                .bind_mnemonic(&mut session, phrase.trim())
                .map_err(|e| e.to_string())?;
        }
        None => controller
            .generate_mnemonic(&mut session)
            .map_err(|e| e.to_string())?,
    }

    // Fail on incomplete data before prompting.
    session.request_save().map_err(|e| e.to_string())?;

    let password = read_password("Password: ").ok_or("no password given")?;
    let record = controller
        .save(&mut session, password)
        .await
        .map_err(|e| e.to_string())?;

    print_record(&record, "wallet created", opts.json);
    if mnemonic_file.is_none() {
        output::print_warning(
            "the phrase was generated and sealed; back it up with `walletkeep export`",
            opts.json,
        );
    }
    Ok(())
}

/// Imports a wallet from a JSON file, sealing it with the stored
/// wallet password.
pub async fn import(
    name: &str,
    file: &Path,
    address_type: Option<&str>,
    opts: &GlobalOpts,
) -> std::result::Result<(), String> {
    let json = read_secret_file(file)?;

    let controller = build_controller(opts).await?;
    let mut session = controller.new_session();
    session
        .set_details(name, address_type.unwrap_or_default())
        .map_err(|e| e.to_string())?;
    controller
        .import_file(&mut session, &json)
        .map_err(|e| e.to_string())?;

    let record = controller
        .save_import(&mut session)
        .await
        .map_err(|e| e.to_string())?;

    print_record(&record, "wallet imported", opts.json);
    Ok(())
}

/// Decrypts a wallet and writes its export file to `out` or stdout.
pub async fn export(name: &str, out: Option<&Path>, opts: &GlobalOpts) -> std::result::Result<(), String> {
    let controller = build_controller(opts).await?;
    let password = read_password("Password: ").ok_or("no password given")?;

    let export = controller
        .export_wallet(name, password)
        .await
        .map_err(|e| e.to_string())?;
    let json = export.to_json().map_err(|e| e.to_string())?;

    match out {
        Some(path) => {
            std::fs::write(path, json.as_bytes())
                .map_err(|e| format!("failed to write export file: {e}"))?;
            output::print_success(&format!("wallet exported to {}", path.display()), opts.json);
        }
        None => println!("{}", json.as_str()),
    }
    Ok(())
}

fn read_secret_file(path: &Path) -> std::result::Result<Zeroizing<String>, String> {
    std::fs::read_to_string(path)
        .map(Zeroizing::new)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))
}

fn print_record(record: &WalletRecord, msg: &str, json_mode: bool) {
    if !json_mode {
        output::print_success(msg, false);
    }
    output::print_fields(
        &[
            ("id", record.id.to_string()),
            ("name", record.name.clone()),
            ("address_type", record.address_type.clone()),
            ("address", record.public_key.clone()),
        ],
        json_mode,
    );
}
