//! Core data models for depadvice
//!
//! These models describe the inputs of an analysis run (coordinates,
//! declarations, symbol sets) and the advice it produces. Everything here is
//! immutable once built; advice sets are ordered so two runs over the same
//! input serialize identically.

use crate::error::AdviceError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Identity of a dependency: `group:name:version`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Coordinate {
    pub group: String,
    pub name: String,
    pub version: String,
}

impl Coordinate {
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.name, self.version)
    }
}

impl FromStr for Coordinate {
    type Err = AdviceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        match parts.as_slice() {
            [group, name, version]
                if !group.is_empty() && !name.is_empty() && !version.is_empty() =>
            {
                Ok(Coordinate::new(*group, *name, *version))
            }
            _ => Err(AdviceError::InvalidCoordinate(s.to_string())),
        }
    }
}

impl TryFrom<String> for Coordinate {
    type Error = AdviceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Coordinate> for String {
    fn from(value: Coordinate) -> Self {
        value.to_string()
    }
}

/// Declared scope of a dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Configuration {
    Api,
    Implementation,
    CompileOnly,
    RuntimeOnly,
    AnnotationProcessor,
    Kapt,
}

impl Configuration {
    pub fn as_str(&self) -> &'static str {
        match self {
            Configuration::Api => "api",
            Configuration::Implementation => "implementation",
            Configuration::CompileOnly => "compileOnly",
            Configuration::RuntimeOnly => "runtimeOnly",
            Configuration::AnnotationProcessor => "annotationProcessor",
            Configuration::Kapt => "kapt",
        }
    }

    /// Processor-class configurations feed a source processor, not the classpath
    pub fn is_processor(&self) -> bool {
        self.toolchain().is_some()
    }

    pub fn toolchain(&self) -> Option<ProcessorToolchain> {
        match self {
            Configuration::AnnotationProcessor => Some(ProcessorToolchain::AnnotationProcessor),
            Configuration::Kapt => Some(ProcessorToolchain::Kapt),
            _ => None,
        }
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Configuration {
    type Err = AdviceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "api" => Ok(Configuration::Api),
            "implementation" => Ok(Configuration::Implementation),
            "compileOnly" => Ok(Configuration::CompileOnly),
            "runtimeOnly" => Ok(Configuration::RuntimeOnly),
            "annotationProcessor" => Ok(Configuration::AnnotationProcessor),
            "kapt" => Ok(Configuration::Kapt),
            other => Err(AdviceError::UnknownConfiguration(other.to_string())),
        }
    }
}

/// Annotation-processing toolchains a module can apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProcessorToolchain {
    Kapt,
    AnnotationProcessor,
}

impl ProcessorToolchain {
    pub const ALL: [ProcessorToolchain; 2] =
        [ProcessorToolchain::Kapt, ProcessorToolchain::AnnotationProcessor];

    /// Configuration that processor dependencies of this toolchain live in
    pub fn configuration(&self) -> Configuration {
        match self {
            ProcessorToolchain::Kapt => Configuration::Kapt,
            ProcessorToolchain::AnnotationProcessor => Configuration::AnnotationProcessor,
        }
    }

    /// Name used when advising removal of the toolchain
    pub fn plugin_name(&self) -> &'static str {
        match self {
            ProcessorToolchain::Kapt => "kotlin-kapt",
            ProcessorToolchain::AnnotationProcessor => "annotationProcessor",
        }
    }
}

/// A dependency as declared by a module
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeclaredDependency {
    pub coordinate: Coordinate,
    pub configuration: Configuration,
}

impl DeclaredDependency {
    pub fn new(coordinate: Coordinate, configuration: Configuration) -> Self {
        Self {
            coordinate,
            configuration,
        }
    }
}

impl fmt::Display for DeclaredDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.configuration, self.coordinate)
    }
}

/// Immutable ordered set of fully-qualified symbol names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolSet(BTreeSet<String>);

impl SymbolSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.0.contains(symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn intersects(&self, other: &SymbolSet) -> bool {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.iter().any(|s| large.contains(s))
    }

    /// Match a trigger pattern: an exact name, or `package.*` for any
    /// symbol under that package
    pub fn matches_pattern(&self, pattern: &str) -> bool {
        match pattern.strip_suffix(".*") {
            Some(package) => {
                let prefix = format!("{package}.");
                self.0
                    .range(prefix.clone()..)
                    .next()
                    .is_some_and(|s| s.starts_with(&prefix))
            }
            None => self.contains(pattern),
        }
    }
}

impl<S: Into<String>> FromIterator<S> for SymbolSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        SymbolSet(iter.into_iter().map(Into::into).collect())
    }
}

/// How a module uses one of its declared dependencies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum UsageClassification {
    Unused,
    UsedDirectly,
    /// Needed only to satisfy `via`, another used dependency
    UsedTransitivelyOnly { via: Coordinate },
    ProcessorActive,
    ProcessorInactive,
}

impl fmt::Display for UsageClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsageClassification::Unused => write!(f, "unused"),
            UsageClassification::UsedDirectly => write!(f, "used directly"),
            UsageClassification::UsedTransitivelyOnly { via } => {
                write!(f, "used transitively because of {via}")
            }
            UsageClassification::ProcessorActive => write!(f, "processor active"),
            UsageClassification::ProcessorInactive => write!(f, "processor inactive"),
        }
    }
}

/// A single recommended mutation to a dependency declaration
///
/// Variant order is significant: it is the primary sort key when advice is
/// rendered, followed by the coordinate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Advice {
    #[serde(rename_all = "camelCase")]
    Add {
        coordinate: Coordinate,
        to_configuration: Configuration,
    },
    #[serde(rename_all = "camelCase")]
    Remove {
        coordinate: Coordinate,
        from_configuration: Configuration,
    },
    #[serde(rename_all = "camelCase")]
    Change {
        coordinate: Coordinate,
        from_configuration: Configuration,
        to_configuration: Configuration,
    },
}

impl Advice {
    pub fn add(coordinate: Coordinate, to_configuration: Configuration) -> Self {
        Advice::Add {
            coordinate,
            to_configuration,
        }
    }

    pub fn remove(coordinate: Coordinate, from_configuration: Configuration) -> Self {
        Advice::Remove {
            coordinate,
            from_configuration,
        }
    }

    pub fn change(
        coordinate: Coordinate,
        from_configuration: Configuration,
        to_configuration: Configuration,
    ) -> Self {
        Advice::Change {
            coordinate,
            from_configuration,
            to_configuration,
        }
    }

    pub fn coordinate(&self) -> &Coordinate {
        match self {
            Advice::Add { coordinate, .. }
            | Advice::Remove { coordinate, .. }
            | Advice::Change { coordinate, .. } => coordinate,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Advice::Add { .. } => "add",
            Advice::Remove { .. } => "remove",
            Advice::Change { .. } => "change",
        }
    }
}

impl fmt::Display for Advice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advice::Add {
                coordinate,
                to_configuration,
            } => write!(f, "add {to_configuration} '{coordinate}'"),
            Advice::Remove {
                coordinate,
                from_configuration,
            } => write!(f, "remove {from_configuration} '{coordinate}'"),
            Advice::Change {
                coordinate,
                from_configuration,
                to_configuration,
            } => write!(
                f,
                "change '{coordinate}' from {from_configuration} to {to_configuration}"
            ),
        }
    }
}

/// Module-wide recommendation to drop a whole plugin
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PluginAdvice {
    /// No processor dependency of this toolchain has any effect
    RedundantProcessorPlugin { toolchain: ProcessorToolchain },
    /// `java-library` applied alongside Kotlin JVM in a module with no Java sources
    RedundantJavaLibrary,
    /// Kotlin JVM applied alongside `java-library` in a module with no Kotlin sources
    RedundantKotlinJvm,
}

impl PluginAdvice {
    pub fn redundant_processor(toolchain: ProcessorToolchain) -> Self {
        PluginAdvice::RedundantProcessorPlugin { toolchain }
    }

    /// Plugin the advice asks to remove
    pub fn plugin(&self) -> &'static str {
        match self {
            PluginAdvice::RedundantProcessorPlugin { toolchain } => toolchain.plugin_name(),
            PluginAdvice::RedundantJavaLibrary => "java-library",
            PluginAdvice::RedundantKotlinJvm => "org.jetbrains.kotlin.jvm",
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            PluginAdvice::RedundantProcessorPlugin {
                toolchain: ProcessorToolchain::Kapt,
            } => "kotlin-kapt is applied, but there are no used annotation processors",
            PluginAdvice::RedundantProcessorPlugin {
                toolchain: ProcessorToolchain::AnnotationProcessor,
            } => "annotation processing is configured, but no declared processor is triggered",
            PluginAdvice::RedundantJavaLibrary => {
                "java-library and Kotlin JVM are both applied, but there are no Java sources"
            }
            PluginAdvice::RedundantKotlinJvm => {
                "java-library and Kotlin JVM are both applied, but there are no Kotlin sources"
            }
        }
    }
}

impl fmt::Display for PluginAdvice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.plugin(), self.reason())
    }
}

/// All advice produced for one module
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComprehensiveAdvice {
    pub module_path: String,
    #[serde(default)]
    pub dependency_advice: BTreeSet<Advice>,
    #[serde(default)]
    pub plugin_advice: BTreeSet<PluginAdvice>,
    /// Soft warnings raised while analyzing the module
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub warnings: BTreeSet<String>,
}

impl ComprehensiveAdvice {
    pub fn new(module_path: impl Into<String>) -> Self {
        Self {
            module_path: module_path.into(),
            ..Default::default()
        }
    }

    /// True when there is nothing to act on (warnings don't count)
    pub fn is_empty(&self) -> bool {
        self.dependency_advice.is_empty() && self.plugin_advice.is_empty()
    }
}

/// Aggregated advice for one module in the build-wide report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildHealth {
    pub module_path: String,
    #[serde(default)]
    pub dependency_advice: BTreeSet<Advice>,
    #[serde(default)]
    pub plugin_advice: BTreeSet<PluginAdvice>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub warnings: BTreeSet<String>,
}

impl BuildHealth {
    pub fn is_empty(&self) -> bool {
        self.dependency_advice.is_empty() && self.plugin_advice.is_empty()
    }

    pub fn advice_count(&self) -> usize {
        self.dependency_advice.len() + self.plugin_advice.len()
    }

    /// Union another report for the same module into this one
    pub fn merge(&mut self, other: ComprehensiveAdvice) {
        self.dependency_advice.extend(other.dependency_advice);
        self.plugin_advice.extend(other.plugin_advice);
        self.warnings.extend(other.warnings);
    }
}

impl From<ComprehensiveAdvice> for BuildHealth {
    fn from(advice: ComprehensiveAdvice) -> Self {
        Self {
            module_path: advice.module_path,
            dependency_advice: advice.dependency_advice,
            plugin_advice: advice.plugin_advice,
            warnings: advice.warnings,
        }
    }
}

/// A module whose pipeline failed and contributed no report
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleFailure {
    pub module_path: String,
    pub error: String,
}

/// Build-wide health report: one entry per module that produced a report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateReport {
    pub build_health: Vec<BuildHealth>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<ModuleFailure>,
}

impl AggregateReport {
    /// Entries with something to act on, in module path order
    pub fn with_advice(&self) -> impl Iterator<Item = &BuildHealth> {
        self.build_health.iter().filter(|h| !h.is_empty())
    }

    pub fn has_advice(&self) -> bool {
        self.with_advice().next().is_some()
    }

    pub fn total_advice(&self) -> usize {
        self.build_health.iter().map(BuildHealth::advice_count).sum()
    }
}
