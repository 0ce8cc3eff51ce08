/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Tests for the inventory ledger.

pub mod commit_release;
pub mod concurrency;
