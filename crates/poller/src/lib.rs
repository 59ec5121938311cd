pub mod cycle;
pub mod poller;
