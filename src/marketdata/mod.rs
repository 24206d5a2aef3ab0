//! Reference market data: latest-quote store and the development-mode
//! price simulator.

mod prices;
mod simulator;

pub use prices::ReferencePriceStore;
pub use simulator::PriceSimulator;
