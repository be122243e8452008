// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cryptographic primitives for secrets at rest.

pub mod envelope;

pub use envelope::{EnvelopeCipher, EnvelopeError, EnvelopeKind, MasterKey};
