pub mod adder;
pub mod dedupe;
pub mod fetch;
pub mod naming;
