pub use super::factories::{ObservationFactory, TimestampFactory, WideTableFactory};

pub struct Factory;

impl Factory {
    pub fn observations() -> ObservationFactory {
        ObservationFactory::new()
    }

    pub fn wide_table() -> WideTableFactory {
        WideTableFactory::new()
    }
}
