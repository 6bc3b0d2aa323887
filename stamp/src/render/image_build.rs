use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::ObjectReference;
use kube::api::ObjectMeta;
use stamp_identity::ResolvedIdentity;

use crate::{
    render::{
        object_meta,
        openshift::{
            BuildConfig, BuildConfigSpec, BuildOutput, BuildSource, BuildStrategySpec,
            GitBuildSource, ImageStream, ImageStreamSpec, StrategyFrom, TriggerPolicy,
        },
    },
    values::{BuildStrategy, Values},
};

/// The image stream named `stream` the build pushes to and the workload
/// pulls from.
pub fn image_stream(identity: &ResolvedIdentity, stream: &str) -> ImageStream {
    let metadata = ObjectMeta { name: Some(stream.to_string()), ..object_meta(identity) };
    ImageStream::new(metadata, ImageStreamSpec::default())
}

/// A Git build pushing to `image_stream_tag`.
pub fn build_config(
    identity: &ResolvedIdentity,
    values: &Values,
    image_stream_tag: &str,
) -> BuildConfig {
    let build = &values.build;
    let strategy = match build.strategy {
        BuildStrategy::Source => BuildStrategySpec {
            type_: build.strategy.as_str().to_string(),
            source_strategy: Some(StrategyFrom {
                from: ObjectReference {
                    kind: Some("DockerImage".to_string()),
                    name: Some(build.builder_image.clone()),
                    ..ObjectReference::default()
                },
            }),
            docker_strategy: None,
        },
        BuildStrategy::Docker => BuildStrategySpec {
            type_: build.strategy.as_str().to_string(),
            source_strategy: None,
            docker_strategy: Some(BTreeMap::new()),
        },
    };

    BuildConfig::new(
        object_meta(identity),
        BuildConfigSpec {
            source: BuildSource {
                type_: "Git".to_string(),
                git: GitBuildSource {
                    uri: build.git.uri.clone(),
                    ref_: Some(build.git.reference.clone()).filter(|reference| !reference.is_empty()),
                },
                context_dir: build.git.context_dir.clone().filter(|dir| !dir.is_empty()),
            },
            strategy,
            output: BuildOutput {
                to: ObjectReference {
                    kind: Some("ImageStreamTag".to_string()),
                    name: Some(image_stream_tag.to_string()),
                    ..ObjectReference::default()
                },
            },
            triggers: vec![TriggerPolicy::config_change()],
        },
    )
}
