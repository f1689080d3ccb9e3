// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{process::ExitCode, sync::Arc};

use claims_vault::{
    config::VaultConfig,
    logging,
    storage::{RecordStorage, StoragePaths},
    EncryptionService, Vault,
};

fn main() -> ExitCode {
    let config = match VaultConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(config.log_format) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let encryption = Arc::new(EncryptionService::new(config.master_key.clone()));

    let mut storage = RecordStorage::new(StoragePaths::new(&config.data_dir));
    if let Err(e) = storage.initialize().and_then(|()| storage.health_check()) {
        tracing::error!(
            data_dir = %config.data_dir.display(),
            error = %e,
            "Storage is not usable"
        );
        return ExitCode::FAILURE;
    }

    if let Err(e) = encryption.self_test() {
        tracing::error!(error = %e, "Encryption self-check failed");
        return ExitCode::FAILURE;
    }

    let vault = match Vault::new(storage, encryption) {
        Ok(vault) => vault,
        Err(e) => {
            tracing::error!(error = %e, "Failed to open vault");
            return ExitCode::FAILURE;
        }
    };

    if config.reseal_legacy {
        match vault.reseal_plaintext_records() {
            Ok(summary) if summary.failed > 0 => {
                tracing::warn!(failed = summary.failed, "Some records could not be re-sealed");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!(error = %e, "Re-seal pass failed");
                return ExitCode::FAILURE;
            }
        }
    }

    tracing::info!(
        data_dir = %config.data_dir.display(),
        encryption = %vault.encryption().write_mode(),
        reseal_legacy = config.reseal_legacy,
        "Claims vault ready"
    );
    ExitCode::SUCCESS
}
