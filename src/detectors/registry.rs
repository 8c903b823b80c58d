//! Name-to-detector registry

use super::{
    Baseline, Biome, BiomeDetector, Cicala, CicalaBaseline, Dellaglio, DellaglioIndex, Detector,
    KatoNakamura, Liangrocapart, LiangrocapartRemains, Murphy, PierreMarkuse, Sahm, Yongxue,
};
use crate::types::{FireError, FireResult};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Detectors keyed by case-insensitive name
///
/// Lookups also accept the `AFI` / `AFD` suffixes of the published method
/// names, so `"SahmAFI"` and `"sahm"` resolve to the same detector.
#[derive(Default)]
pub struct DetectorRegistry {
    detectors: BTreeMap<String, Box<dyn Detector>>,
}

fn normalize(name: &str) -> String {
    let key = name.trim().to_ascii_lowercase();
    match key.strip_suffix("afi").or_else(|| key.strip_suffix("afd")) {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => key,
    }
}

impl DetectorRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in detector
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(Baseline);
        registry.register(Sahm);
        registry.register(PierreMarkuse);
        registry.register(Liangrocapart);
        registry.register(LiangrocapartRemains);
        registry.register(Yongxue);
        registry.register(KatoNakamura);
        registry.register(Murphy);
        registry.register(Cicala);
        registry.register(CicalaBaseline);
        registry.register(Dellaglio::new(DellaglioIndex::Afd5));
        registry.register(Dellaglio::new(DellaglioIndex::Afd3));
        registry.register(Dellaglio::new(DellaglioIndex::Afd4));
        for biome in Biome::ALL {
            registry.register(BiomeDetector::new(biome));
        }

        registry
    }

    /// Add a detector under its own name, returning any detector it replaces
    pub fn register<D: Detector + 'static>(&mut self, detector: D) -> Option<Box<dyn Detector>> {
        let key = normalize(detector.name());
        self.detectors.insert(key, Box::new(detector))
    }

    pub fn get(&self, name: &str) -> FireResult<&dyn Detector> {
        self.detectors
            .get(&normalize(name))
            .map(|detector| detector.as_ref())
            .ok_or_else(|| FireError::UnknownDetector(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.detectors.contains_key(&normalize(name))
    }

    /// Registered detector names
    pub fn names(&self) -> Vec<&str> {
        self.detectors.values().map(|detector| detector.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }
}

static DEFAULT_REGISTRY: OnceLock<DetectorRegistry> = OnceLock::new();

/// Process-wide registry of the built-in detectors, created on first use
pub fn default_registry() -> &'static DetectorRegistry {
    DEFAULT_REGISTRY.get_or_init(DetectorRegistry::with_defaults)
}

/// Look up a built-in detector by name
pub fn get_detector(name: &str) -> FireResult<&'static dyn Detector> {
    default_registry().get(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = DetectorRegistry::with_defaults();
        assert_eq!(registry.get("sahm").unwrap().name(), "Sahm");
        assert_eq!(registry.get("SAHM").unwrap().name(), "Sahm");
        assert_eq!(registry.get("SahmAFI").unwrap().name(), "Sahm");
        assert_eq!(registry.get("Dellaglio3AFD").unwrap().name(), "Dellaglio3");
    }

    #[test]
    fn test_unknown_detector() {
        let registry = DetectorRegistry::with_defaults();
        assert!(matches!(
            registry.get("Unknown"),
            Err(FireError::UnknownDetector(_))
        ));
        assert!(matches!(
            registry.get("afi"),
            Err(FireError::UnknownDetector(_))
        ));
    }

    #[test]
    fn test_default_registry_contents() {
        let registry = DetectorRegistry::with_defaults();
        assert_eq!(registry.len(), 19);
        for name in [
            "Baseline",
            "Sahm",
            "PierreMarkuse",
            "Liangrocapart",
            "Yongxue",
            "KatoNakamura",
            "Murphy",
            "Taiga",
        ] {
            assert!(registry.contains(name), "{} missing", name);
        }
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = DetectorRegistry::new();
        assert!(registry.register(Sahm).is_none());
        assert!(registry.register(Sahm).is_some());
        assert_eq!(registry.names(), vec!["Sahm"]);
    }

    #[test]
    fn test_global_lookup() {
        assert_eq!(get_detector("murphy").unwrap().name(), "Murphy");
        assert!(std::ptr::eq(default_registry(), default_registry()));
    }
}
