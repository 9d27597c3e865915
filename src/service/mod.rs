pub mod artifact_store;
pub mod dispatcher;
pub mod ics;
pub mod message_templates;
pub mod opt_in_registry;
pub mod translator;
