mod coordinator;

pub use coordinator::FanOutCoordinator;
