//! REST paths of the edge-cloud and resource-manager APIs, as path segments.

const EDGE_API_VERSION: &str = "v1beta1";
const RESOURCE_MANAGER_API_VERSION: &str = "v2";

fn segments(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| (*s).to_string()).collect()
}

/// Collection of instances in a project and region.
#[must_use]
pub fn instances(project_id: &str, region: &str) -> Vec<String> {
    segments(&[
        EDGE_API_VERSION,
        "projects",
        project_id,
        "regions",
        region,
        "instances",
    ])
}

/// A single instance addressed by id.
#[must_use]
pub fn instance(project_id: &str, region: &str, instance_id: &str) -> Vec<String> {
    let mut path = instances(project_id, region);
    path.push(instance_id.to_string());
    path
}

/// A single instance addressed by display name.
#[must_use]
pub fn instance_by_name(project_id: &str, region: &str, display_name: &str) -> Vec<String> {
    segments(&[
        EDGE_API_VERSION,
        "projects",
        project_id,
        "regions",
        region,
        "instancesbyname",
        display_name,
    ])
}

/// Plans available to a project.
#[must_use]
pub fn plans(project_id: &str) -> Vec<String> {
    segments(&[EDGE_API_VERSION, "projects", project_id, "plans"])
}

/// A project in the resource manager.
#[must_use]
pub fn project(project_id: &str) -> Vec<String> {
    segments(&[RESOURCE_MANAGER_API_VERSION, "projects", project_id])
}

/// Render segments as an absolute path, for logs and fakes.
#[must_use]
pub fn display(segments: &[String]) -> String {
    format!("/{}", segments.join("/"))
}
