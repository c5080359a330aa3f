// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
FreeSurfer command lines

Builders for the three external invocations of a subject run:

| Builder | Program | Purpose |
|---------|---------|---------|
| [`ReconAll`] | `recon-all` | full reconstruction, resumed when `mri/` exists |
| [`HippocampalSubfields`] | `recon-all` | one subfield pass per [`HsfsMode`] |
| [`SegStats`] | `mri_segstats` | white/gray matter summary into `stats/` |

Every command carries `SUBJECTS_DIR` in its environment; the runner adds
`FREESURFER_HOME` when the installation directory is configured.
*/

use crate::{PipelineError, PipelineResult};
use fsp_stats::hsfs::MRI_DIR_NAME;
use fsp_stats::subject::STATS_DIR_NAME;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const RECON_ALL: &str = "recon-all";
pub const MRI_SEGSTATS: &str = "mri_segstats";
pub const SUBJECTS_DIR_ENV: &str = "SUBJECTS_DIR";
pub const FREESURFER_HOME_ENV: &str = "FREESURFER_HOME";

const QCACHE_FLAG: &str = "-qcache";

/// A program, its arguments and extra environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: String,
    subject_id: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>, subject_id: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            subject_id: subject_id.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy())
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Point the tool at a FreeSurfer installation
    pub fn freesurfer_home(self, home: Option<&Path>) -> Self {
        match home {
            Some(home) => self.env(FREESURFER_HOME_ENV, home.to_string_lossy()),
            None => self,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Subject the command works on
    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    pub fn get_env(&self) -> &[(String, String)] {
        &self.env
    }

    /// `std::process::Command` ready to spawn
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command.envs(self.env.iter().map(|(k, v)| (k, v)));
        command
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

fn with_subjects_dir(command: ToolCommand, subjects_dir: &Path) -> ToolCommand {
    command.env(SUBJECTS_DIR_ENV, subjects_dir.to_string_lossy())
}

/// `recon-all` reconstruction of one subject
#[derive(Debug, Clone)]
pub struct ReconAll {
    subjects_dir: PathBuf,
    subject_id: String,
    directive: String,
    t1_file: Option<PathBuf>,
    t2_file: Option<PathBuf>,
    use_t2: bool,
    openmp_threads: Option<usize>,
    extra_flags: Vec<String>,
}

impl ReconAll {
    pub fn new(subjects_dir: impl Into<PathBuf>, subject_id: impl Into<String>) -> Self {
        Self {
            subjects_dir: subjects_dir.into(),
            subject_id: subject_id.into(),
            directive: "all".to_string(),
            t1_file: None,
            t2_file: None,
            use_t2: false,
            openmp_threads: None,
            extra_flags: Vec::new(),
        }
    }

    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        self.directive = directive.into();
        self
    }

    pub fn t1_file(mut self, path: Option<PathBuf>) -> Self {
        self.t1_file = path;
        self
    }

    /// Refine the pial surface with a T2 scan (`-T2 <file> -T2pial`)
    pub fn t2_refinement(mut self, path: Option<PathBuf>, enabled: bool) -> Self {
        self.t2_file = path;
        self.use_t2 = enabled;
        self
    }

    pub fn openmp_threads(mut self, threads: usize) -> Self {
        self.openmp_threads = Some(threads);
        self
    }

    pub fn extra_flags(mut self, flags: &[String]) -> Self {
        self.extra_flags = flags.to_vec();
        self
    }

    /// A subject with an `mri` directory is resumed, not re-imported
    pub fn is_resuming(&self) -> bool {
        self.subjects_dir
            .join(&self.subject_id)
            .join(MRI_DIR_NAME)
            .is_dir()
    }

    /// # Errors
    ///
    /// `PipelineError::MissingScan` when a fresh run has no T1, or T2
    /// refinement is on without a T2.
    pub fn build(&self) -> PipelineResult<ToolCommand> {
        let mut command =
            ToolCommand::new(RECON_ALL, &self.subject_id).arg(format!("-{}", self.directive));

        if !self.is_resuming() {
            let t1 = self
                .t1_file
                .as_deref()
                .ok_or_else(|| missing_scan(&self.subject_id, "T1"))?;
            command = command.arg("-i").path_arg(t1);
        }

        if self.use_t2 {
            let t2 = self
                .t2_file
                .as_deref()
                .ok_or_else(|| missing_scan(&self.subject_id, "T2"))?;
            command = command.arg("-T2").path_arg(t2).arg("-T2pial");
        }

        if let Some(threads) = self.openmp_threads {
            command = command.arg("-openmp").arg(threads.to_string());
        }

        let command = command
            .args(self.extra_flags.iter().cloned())
            .arg("-subjid")
            .arg(&self.subject_id)
            .arg("-sd")
            .path_arg(&self.subjects_dir);
        Ok(with_subjects_dir(command, &self.subjects_dir))
    }
}

fn missing_scan(subject_id: &str, kind: &str) -> PipelineError {
    PipelineError::MissingScan {
        subject_id: subject_id.to_string(),
        kind: kind.to_string(),
    }
}

/// Which scans a hippocampal subfield pass segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HsfsMode {
    /// T1 only
    T1,
    /// T2 only, analysis id `T2`
    T2,
    /// T1 and T2 together, analysis id `T1T2`
    T1T2,
}

impl HsfsMode {
    /// Enabled modes in run order
    pub fn enabled(t1: bool, t2: bool, t1t2: bool) -> Vec<HsfsMode> {
        [(t1, HsfsMode::T1), (t2, HsfsMode::T2), (t1t2, HsfsMode::T1T2)]
            .into_iter()
            .filter_map(|(on, mode)| on.then_some(mode))
            .collect()
    }

    pub fn needs_t2(self) -> bool {
        !matches!(self, HsfsMode::T1)
    }

    /// Arguments selecting the pass
    fn args(self, t2: Option<&Path>) -> Vec<String> {
        let t2 = t2.map(|p| p.to_string_lossy().into_owned()).unwrap_or_default();
        match self {
            HsfsMode::T1 => vec!["-hippocampal-subfields-T1".to_string()],
            HsfsMode::T2 => vec!["-hippocampal-subfields-T2".to_string(), t2, "T2".to_string()],
            HsfsMode::T1T2 => vec![
                "-hippocampal-subfields-T1T2".to_string(),
                t2,
                "T1T2".to_string(),
            ],
        }
    }
}

impl fmt::Display for HsfsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HsfsMode::T1 => "T1",
            HsfsMode::T2 => "T2",
            HsfsMode::T1T2 => "T1T2",
        };
        f.write_str(name)
    }
}

/// Follow-up `recon-all` pass for hippocampal subfields
#[derive(Debug, Clone)]
pub struct HippocampalSubfields {
    subjects_dir: PathBuf,
    subject_id: String,
    mode: HsfsMode,
    t2_file: Option<PathBuf>,
    extra_flags: Vec<String>,
}

impl HippocampalSubfields {
    pub fn new(
        subjects_dir: impl Into<PathBuf>,
        subject_id: impl Into<String>,
        mode: HsfsMode,
    ) -> Self {
        Self {
            subjects_dir: subjects_dir.into(),
            subject_id: subject_id.into(),
            mode,
            t2_file: None,
            extra_flags: Vec::new(),
        }
    }

    pub fn t2_file(mut self, path: Option<PathBuf>) -> Self {
        self.t2_file = path;
        self
    }

    /// Extra `recon-all` flags; `-qcache` is dropped for subfield passes
    pub fn extra_flags(mut self, flags: &[String]) -> Self {
        self.extra_flags = flags
            .iter()
            .filter(|flag| flag.as_str() != QCACHE_FLAG)
            .cloned()
            .collect();
        self
    }

    pub fn mode(&self) -> HsfsMode {
        self.mode
    }

    pub fn build(&self) -> PipelineResult<ToolCommand> {
        if self.mode.needs_t2() && self.t2_file.is_none() {
            return Err(missing_scan(&self.subject_id, "T2"));
        }

        let command = ToolCommand::new(RECON_ALL, &self.subject_id)
            .args(self.mode.args(self.t2_file.as_deref()))
            .args(self.extra_flags.iter().cloned())
            .arg("-subjid")
            .arg(&self.subject_id)
            .arg("-sd")
            .path_arg(&self.subjects_dir);
        Ok(with_subjects_dir(command, &self.subjects_dir))
    }
}

/// `mri_segstats` summary over a fixed set of segment ids
#[derive(Debug, Clone)]
pub struct SegStats {
    subjects_dir: PathBuf,
    subject_id: String,
    segment_ids: Vec<u32>,
    summary_file: String,
}

impl SegStats {
    pub const DEFAULT_SEGMENT_IDS: [u32; 5] = [41, 2, 42, 3, 77];
    pub const DEFAULT_SUMMARY_FILE: &'static str = "wmgm.aseg.stats";

    pub fn new(subjects_dir: impl Into<PathBuf>, subject_id: impl Into<String>) -> Self {
        Self {
            subjects_dir: subjects_dir.into(),
            subject_id: subject_id.into(),
            segment_ids: Self::DEFAULT_SEGMENT_IDS.to_vec(),
            summary_file: Self::DEFAULT_SUMMARY_FILE.to_string(),
        }
    }

    pub fn segment_ids(mut self, ids: &[u32]) -> Self {
        self.segment_ids = ids.to_vec();
        self
    }

    pub fn summary_file(mut self, name: impl Into<String>) -> Self {
        self.summary_file = name.into();
        self
    }

    /// `{subject}/stats/{summary_file}`
    pub fn summary_path(&self) -> PathBuf {
        self.subjects_dir
            .join(&self.subject_id)
            .join(STATS_DIR_NAME)
            .join(&self.summary_file)
    }

    pub fn build(&self) -> ToolCommand {
        let mri = self.subjects_dir.join(&self.subject_id).join(MRI_DIR_NAME);
        let command = ToolCommand::new(MRI_SEGSTATS, &self.subject_id)
            .arg("--seg")
            .path_arg(&mri.join("aseg.mgz"))
            .arg("--pv")
            .path_arg(&mri.join("norm.mgz"))
            .arg("--sum")
            .path_arg(&self.summary_path())
            .arg("--id")
            .args(self.segment_ids.iter().map(u32::to_string))
            .arg("--ctab-default");
        with_subjects_dir(command, &self.subjects_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn args(command: &ToolCommand) -> Vec<&str> {
        command.get_args().iter().map(String::as_str).collect()
    }

    #[test]
    fn test_recon_all_fresh_subject() {
        let command = ReconAll::new("/out", "sub-001")
            .t1_file(Some(PathBuf::from("/scans/sub-001/sub-001_T1w.nii.gz")))
            .openmp_threads(4)
            .extra_flags(&["-time".to_string(), "-3T".to_string()])
            .build()
            .unwrap();

        assert_eq!(command.program(), RECON_ALL);
        assert_eq!(
            args(&command),
            vec![
                "-all",
                "-i",
                "/scans/sub-001/sub-001_T1w.nii.gz",
                "-openmp",
                "4",
                "-time",
                "-3T",
                "-subjid",
                "sub-001",
                "-sd",
                "/out",
            ]
        );
        assert_eq!(
            command.get_env(),
            &[(SUBJECTS_DIR_ENV.to_string(), "/out".to_string())]
        );
    }

    #[test]
    fn test_freesurfer_home_env() {
        let command = SegStats::new("/out", "sub-001")
            .build()
            .freesurfer_home(Some(Path::new("/usr/local/freesurfer")));
        assert_eq!(
            command.get_env(),
            &[
                (SUBJECTS_DIR_ENV.to_string(), "/out".to_string()),
                (FREESURFER_HOME_ENV.to_string(), "/usr/local/freesurfer".to_string()),
            ]
        );

        let command = SegStats::new("/out", "sub-001").build().freesurfer_home(None);
        assert_eq!(command.get_env().len(), 1);
    }

    #[test]
    fn test_recon_all_with_t2_refinement() {
        let command = ReconAll::new("/out", "sub-001")
            .t1_file(Some(PathBuf::from("t1.nii.gz")))
            .t2_refinement(Some(PathBuf::from("t2.nii.gz")), true)
            .build()
            .unwrap();

        assert_eq!(
            command.to_string(),
            "recon-all -all -i t1.nii.gz -T2 t2.nii.gz -T2pial -subjid sub-001 -sd /out"
        );
    }

    #[test]
    fn test_recon_all_missing_scans() {
        let err = ReconAll::new("/out", "sub-001").build().unwrap_err();
        assert!(matches!(err, PipelineError::MissingScan { ref kind, .. } if kind == "T1"));

        let err = ReconAll::new("/out", "sub-001")
            .t1_file(Some(PathBuf::from("t1.nii.gz")))
            .t2_refinement(None, true)
            .build()
            .unwrap_err();
        assert!(matches!(err, PipelineError::MissingScan { ref kind, .. } if kind == "T2"));
    }

    #[test]
    fn test_recon_all_resume_skips_input() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub-001").join(MRI_DIR_NAME)).unwrap();

        let recon = ReconAll::new(dir.path(), "sub-001");
        assert!(recon.is_resuming());
        let command = recon.build().unwrap();
        assert!(!command.get_args().contains(&"-i".to_string()));
    }

    #[test]
    fn test_hsfs_modes() {
        let flags = vec!["-time".to_string(), "-qcache".to_string()];
        let t2 = Some(PathBuf::from("t2.nii.gz"));

        let t1 = HippocampalSubfields::new("/out", "s", HsfsMode::T1)
            .extra_flags(&flags)
            .build()
            .unwrap();
        assert_eq!(
            t1.to_string(),
            "recon-all -hippocampal-subfields-T1 -time -subjid s -sd /out"
        );

        let t2_only = HippocampalSubfields::new("/out", "s", HsfsMode::T2)
            .t2_file(t2.clone())
            .build()
            .unwrap();
        assert_eq!(
            args(&t2_only)[..3],
            ["-hippocampal-subfields-T2", "t2.nii.gz", "T2"]
        );

        let both = HippocampalSubfields::new("/out", "s", HsfsMode::T1T2)
            .t2_file(t2)
            .build()
            .unwrap();
        assert_eq!(
            args(&both)[..3],
            ["-hippocampal-subfields-T1T2", "t2.nii.gz", "T1T2"]
        );

        let err = HippocampalSubfields::new("/out", "s", HsfsMode::T1T2)
            .build()
            .unwrap_err();
        assert!(matches!(err, PipelineError::MissingScan { .. }));
    }

    #[test]
    fn test_enabled_modes_order() {
        assert_eq!(
            HsfsMode::enabled(true, false, true),
            vec![HsfsMode::T1, HsfsMode::T1T2]
        );
        assert!(HsfsMode::enabled(false, false, false).is_empty());
    }

    #[test]
    fn test_segstats_command() {
        let segstats = SegStats::new("/out", "sub-001");
        assert_eq!(
            segstats.summary_path(),
            PathBuf::from("/out/sub-001/stats/wmgm.aseg.stats")
        );
        assert_eq!(
            segstats.build().to_string(),
            "mri_segstats --seg /out/sub-001/mri/aseg.mgz --pv /out/sub-001/mri/norm.mgz \
             --sum /out/sub-001/stats/wmgm.aseg.stats --id 41 2 42 3 77 --ctab-default"
        );
    }
}
