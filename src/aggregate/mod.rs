pub mod step;
pub use step::*;

pub mod aggregate_error;
pub use aggregate_error::*;

pub mod signature;
pub use signature::*;

pub mod accumulator;
pub use accumulator::*;

pub mod operator;
pub use operator::*;

pub mod factory;
pub use factory::*;

pub mod resolver;
pub use resolver::AggregateResolver;

pub mod function_catalog;
pub use function_catalog::*;

pub mod legacy_registry;
pub use legacy_registry::*;

pub mod dispatcher;
pub use dispatcher::*;

pub mod registry_config;
pub use registry_config::*;

pub mod aggregate_registry;
pub use aggregate_registry::*;

pub mod functions;
pub use functions::*;
