//! Transaction management.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing, querying, and managing transactions
//! - The JSON endpoints for transactions

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod form;
mod list_endpoint;

pub use core::{
    Transaction, TransactionBuilder, TransactionFilter, TransactionType, create_occurrence,
    create_transaction_table, get_recurring_transactions, get_transactions,
};
pub use create_endpoint::{TransactionWriteState, create_transaction_endpoint};
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use form::TransactionForm;
pub use list_endpoint::{TransactionsState, get_transaction_endpoint, list_transactions_endpoint};

#[cfg(test)]
pub use core::{create_transaction, delete_transaction, get_transaction, update_transaction};
