// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Client-local recovery-phrase vault.
//!
//! This module ships in the client build and never touches the server: the
//! encrypted payload lives in client-local storage, and removing the backup
//! is simply deleting that payload.

pub mod phrase;

pub use phrase::{decrypt_phrase, encrypt_phrase, PhraseBackupPayload, VaultError};
