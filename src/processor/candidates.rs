use crate::config::PersistedConfig;
use crate::processor::{Platform, SCRIPT_FILE_NAME};
use std::path::{Path, PathBuf};

/// Everything the candidate generators look at. Nothing here touches the
/// filesystem.
#[derive(Debug, Clone, Copy)]
pub struct LocatorContext<'a> {
    pub platform: Platform,
    pub resources_dir: Option<&'a Path>,
    pub install_dir: Option<&'a Path>,
    pub input_path: Option<&'a Path>,
    pub persisted: &'a PersistedConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateOrigin {
    PackagedResources,
    InstallDir,
    InputDir,
    Persisted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub origin: CandidateOrigin,
    pub path: PathBuf,
}

type CandidateSource = fn(&LocatorContext<'_>) -> Vec<PathBuf>;

/// Generators in priority order. The first existing path wins, so moving an
/// entry here changes which processor a user gets.
const CANDIDATE_SOURCES: [(CandidateOrigin, CandidateSource); 4] = [
    (CandidateOrigin::PackagedResources, packaged_resources),
    (CandidateOrigin::InstallDir, install_dir),
    (CandidateOrigin::InputDir, input_dir),
    (CandidateOrigin::Persisted, persisted),
];

pub fn candidate_list(ctx: &LocatorContext<'_>) -> Vec<Candidate> {
    CANDIDATE_SOURCES
        .iter()
        .flat_map(|(origin, source)| {
            source(ctx).into_iter().map(move |path| Candidate {
                origin: *origin,
                path,
            })
        })
        .collect()
}

fn bundled(platform: Platform, dir: &Path) -> Vec<PathBuf> {
    vec![
        dir.join(platform.bundled_binary_path()),
        dir.join(SCRIPT_FILE_NAME),
    ]
}

fn packaged_resources(ctx: &LocatorContext<'_>) -> Vec<PathBuf> {
    ctx.resources_dir
        .map(|dir| bundled(ctx.platform, dir))
        .unwrap_or_default()
}

fn install_dir(ctx: &LocatorContext<'_>) -> Vec<PathBuf> {
    ctx.install_dir
        .map(|dir| bundled(ctx.platform, dir))
        .unwrap_or_default()
}

fn input_dir(ctx: &LocatorContext<'_>) -> Vec<PathBuf> {
    let Some(input) = ctx.input_path else {
        return Vec::new();
    };
    let dir = input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    vec![
        dir.join(ctx.platform.binary_file_name()),
        dir.join(SCRIPT_FILE_NAME),
    ]
}

fn persisted(ctx: &LocatorContext<'_>) -> Vec<PathBuf> {
    ctx.persisted
        .processor_path()
        .map(|path| vec![PathBuf::from(path)])
        .unwrap_or_default()
}
