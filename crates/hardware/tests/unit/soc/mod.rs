/// Fill latency controllers.
pub mod controller;
