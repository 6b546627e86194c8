pub(crate) mod ack;
pub(crate) mod entity_state;
pub(crate) mod mode;
pub(crate) mod param;
pub(crate) mod response_common;
pub(crate) mod service_call;
pub(crate) mod service_status;
