mod deployment;
mod response;

pub use deployment::{
    BulkDeploymentRequest, DeploymentPayload, DeploymentRequest, DeploymentState,
    EnvironmentPayload, EnvironmentType, PipelinePayload, SCHEMA_VERSION,
};
pub use response::{
    ApiErrorMessage, BulkDeploymentResponse, DeploymentKey, DeploymentRecord, EnvironmentRecord,
    PipelineRecord, RejectedDeployment,
};
