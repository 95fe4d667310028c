//! Deploy workflow module

pub mod fsm;
pub mod naming;
pub mod selector;
pub mod workflow;
