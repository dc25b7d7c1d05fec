//! # minsftp – SFTP
//!
//! Blocking SFTP client built on libssh2 providing:
//!   • A session state machine (connect → handshake → authenticate → ready)
//!     with ordered, idempotent teardown
//!   • Password, in-memory private key and keyboard-interactive auth
//!   • Whole-file byte transfer (read / write / copy / checksum)
//!   • Rename, unlink and recursive directory copy / delete
//!   • A closed result-code enumeration for every operation

pub mod sftp;
