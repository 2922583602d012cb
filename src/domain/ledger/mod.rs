//! Ledger aggregate: top-up log entries and receipts.

pub mod model;

pub use model::{
    new_reference_number, TopupKind, TopupLogEntry, TopupReceipt, VoidReceipt,
    VOID_WINDOW_MINUTES,
};
