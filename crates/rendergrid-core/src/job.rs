//! Render job model and plan expansion

use crate::config::RenderPlan;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One unit of rendering work: a single frame of a single render layer.
///
/// Jobs are immutable descriptors created once per run by [`expand_jobs`]
/// and consumed exactly once by the launcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderJob {
    /// Render-layer identifier (e.g. "nucleus", "jets", "all")
    pub layer: String,
    /// Frame number within the animation
    pub frame: u32,
    /// Output path prefix; the renderer appends the zero-padded frame number
    pub output_path: PathBuf,
}

impl std::fmt::Display for RenderJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{:04}", self.layer, self.frame)
    }
}

/// Expand a render plan into the ordered job sequence.
///
/// Iteration is frame-major: every layer of frame N is enumerated before
/// any layer of frame N+1. Layers follow the sorted order of the plan's
/// layer map, so the sequence is deterministic for a given plan.
pub fn expand_jobs(plan: &RenderPlan) -> Vec<RenderJob> {
    let frames = plan.end_frame.saturating_sub(plan.start_frame) as usize + 1;
    let mut jobs = Vec::with_capacity(frames * plan.layers.len());
    for frame in plan.start_frame..=plan.end_frame {
        for layer in plan.layers.keys() {
            let output_path = plan
                .output_dir
                .join(&plan.scene)
                .join(layer)
                .join("frame_");
            jobs.push(RenderJob {
                layer: layer.clone(),
                frame,
                output_path,
            });
        }
    }
    jobs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn plan(start: u32, end: u32, layers: &[(&str, &str)]) -> RenderPlan {
        RenderPlan {
            scene: "002".to_string(),
            start_frame: start,
            end_frame: end,
            output_dir: PathBuf::from("/tmp/dataset"),
            layers: layers
                .iter()
                .map(|(l, t)| (l.to_string(), t.to_string()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn test_expand_job_count() {
        let plan = plan(10, 14, &[("jets", "Dust.001"), ("nucleus", "Surface.001")]);
        let jobs = expand_jobs(&plan);
        // (14 - 10 + 1) frames x 2 layers
        assert_eq!(jobs.len(), 10);
    }

    #[test]
    fn test_expand_frame_major_order() {
        let plan = plan(0, 1, &[("a", "obj1"), ("b", "obj2")]);
        let jobs = expand_jobs(&plan);
        let pairs: Vec<(&str, u32)> = jobs.iter().map(|j| (j.layer.as_str(), j.frame)).collect();
        assert_eq!(pairs, vec![("a", 0), ("b", 0), ("a", 1), ("b", 1)]);
    }

    #[test]
    fn test_expand_unique_layer_frame_pairs() {
        let plan = plan(0, 3, &[("a", "x"), ("b", "y"), ("c", "z")]);
        let jobs = expand_jobs(&plan);
        let mut seen = std::collections::HashSet::new();
        for job in &jobs {
            assert!(seen.insert((job.layer.clone(), job.frame)));
        }
        assert_eq!(seen.len(), 12);
    }

    #[test]
    fn test_output_path_layout() {
        let plan = plan(5, 5, &[("jets", "Dust.001")]);
        let jobs = expand_jobs(&plan);
        assert_eq!(
            jobs[0].output_path,
            PathBuf::from("/tmp/dataset/002/jets/frame_")
        );
    }

    #[test]
    fn test_single_frame_single_layer() {
        let plan = plan(7, 7, &[("all", "all")]);
        let jobs = expand_jobs(&plan);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].frame, 7);
        assert_eq!(jobs[0].to_string(), "all/0007");
    }
}
