use super::http_response::{
    ack, entity_state, mode, param, response_common, service_call, service_status,
};

pub mod arming_put;
pub mod param_get;
pub mod param_set_put;
pub mod rc_override_put;
pub mod request_common;
pub mod reset_world_put;
pub mod service_status_get;
pub mod set_mode_put;
pub mod set_model_state_put;
pub mod takeoff_post;
pub mod target_velocity_put;
