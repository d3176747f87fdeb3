pub mod observation_factory;
pub mod timestamp_factory;
pub mod wide_table_factory;

#[cfg(test)]
mod observation_factory_test;
#[cfg(test)]
mod timestamp_factory_test;
#[cfg(test)]
mod wide_table_factory_test;

pub use observation_factory::ObservationFactory;
pub use timestamp_factory::TimestampFactory;
pub use wide_table_factory::WideTableFactory;
