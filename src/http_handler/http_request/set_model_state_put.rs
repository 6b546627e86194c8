use super::entity_state::SetModelStateResponse;
use super::request_common::{HTTPRequestMethod, HTTPRequestType, JSONBodyHTTPRequestType};
use crate::flight_control::{Pose, VelocityCommand};

/// Request type for the simulator's entity teleport service.
#[derive(serde::Serialize, Debug)]
pub(crate) struct SetModelStateRequest {
    pub(crate) model_state: ModelState,
}

#[derive(serde::Serialize, Debug)]
pub(crate) struct ModelState {
    pub(crate) model_name: String,
    pub(crate) pose: Pose,
    /// Always zero, relocated entities start at rest.
    pub(crate) twist: VelocityCommand,
    /// Empty keeps the frame the entity was spawned in.
    pub(crate) reference_frame: &'static str,
}

impl SetModelStateRequest {
    pub(crate) fn at_rest(model_name: &str, pose: Pose, reference_frame: &'static str) -> Self {
        Self {
            model_state: ModelState {
                model_name: model_name.to_string(),
                pose,
                twist: VelocityCommand::zero(),
                reference_frame,
            },
        }
    }
}

impl JSONBodyHTTPRequestType for SetModelStateRequest {
    type Body = SetModelStateRequest;
    fn body(&self) -> &Self::Body { self }
}

impl HTTPRequestType for SetModelStateRequest {
    type Response = SetModelStateResponse;
    fn endpoint(&self) -> &'static str { "/gazebo/set_model_state" }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Put }
}
