pub mod mock_bus;

pub use mock_bus::MockBus;
