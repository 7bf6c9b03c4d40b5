//! Unit tests for pipeline orchestration.

use super::*;
use crate::error::VendorError;
use crate::extract::MockSourceExtractor;
use crate::fetch::MockReleaseDownloader;
use crate::runner::MockCommandRunner;
use crate::test_utils::{StubDownloader, StubRunner, source_tarball};
use camino::Utf8PathBuf;
use rstest::{fixture, rstest};
use std::collections::BTreeMap;

struct Fixture {
    _temp: tempfile::TempDir,
    context: PipelineContext,
}

impl Fixture {
    fn workspace(&self) -> &VendorWorkspace {
        &self.context.workspace
    }

    fn library(&self) -> Utf8PathBuf {
        self.workspace().installed_library(self.context.platform)
    }

    fn seed_tarball(&self, bytes: &[u8]) {
        let path = self.workspace().tarball_path(&self.context.release);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("create src");
        std::fs::write(path, bytes).expect("seed tarball");
    }

    fn seed_installed_library(&self) {
        let library = self.library();
        std::fs::create_dir_all(library.parent().expect("parent")).expect("create lib");
        std::fs::write(library, b"!<arch>\n").expect("seed library");
    }

    fn stub_runner(&self) -> StubRunner {
        StubRunner::new().installing(self.library())
    }

    fn stub_downloader(&self) -> StubDownloader {
        StubDownloader::new(source_tarball(&self.context.release).expect("tarball"))
    }
}

#[fixture]
fn linux() -> Fixture {
    fixture_for(Platform::Linux)
}

fn fixture_for(platform: Platform) -> Fixture {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = Utf8PathBuf::try_from(temp.path().join("vendor")).expect("UTF-8 path");
    Fixture {
        _temp: temp,
        context: PipelineContext {
            release: Release::new("1.34.5"),
            workspace: VendorWorkspace::new(root),
            platform,
            environment: BuildEnvironment::default(),
            quiet: false,
        },
    }
}

fn toolkit<'a>(runner: &'a StubRunner, downloader: &'a StubDownloader) -> Toolkit<'a> {
    Toolkit {
        runner,
        downloader,
        extractor: &TarGzExtractor,
    }
}

const WARNING: &str = "Warning: failed to verify the integrity of c-ares 1.34.5, re-downloading...";

#[rstest]
fn already_built_workspace_is_left_untouched(linux: Fixture) {
    linux.seed_installed_library();

    let mut runner = MockCommandRunner::new();
    runner.expect_run().never();
    let mut downloader = MockReleaseDownloader::new();
    downloader.expect_download().never();
    let mut extractor = MockSourceExtractor::new();
    extractor.expect_extract().never();
    let toolkit = Toolkit {
        runner: &runner,
        downloader: &downloader,
        extractor: &extractor,
    };

    let mut stderr = Vec::new();
    let action = ensure_built(&linux.context, toolkit, &mut stderr).expect("pipeline");

    assert_eq!(action, BuildAction::AlreadyBuilt);
    assert!(stderr.is_empty());
    assert!(!linux.workspace().src_dir().exists());
}

#[rstest]
fn verified_tarball_is_built_without_refetch(linux: Fixture) {
    linux.seed_tarball(&source_tarball(&linux.context.release).expect("tarball"));
    let runner = linux.stub_runner();
    let downloader = linux.stub_downloader();

    let mut stderr = Vec::new();
    let action =
        ensure_built(&linux.context, toolkit(&runner, &downloader), &mut stderr).expect("pipeline");

    assert_eq!(action, BuildAction::Built { refetched: false });
    assert_eq!(
        runner.prefixes(),
        [
            "gpg-recv-keys-0",
            "gpg-recv-keys-1",
            "gpg-verify",
            "configure",
            "build",
            "install"
        ]
    );
    assert_eq!(downloader.tarball_downloads(), 0);
    let stderr = String::from_utf8(stderr).expect("UTF-8");
    assert!(!stderr.contains(WARNING));
    assert!(stderr.contains("Building c-ares 1.34.5 with Ninja..."));
}

#[rstest]
fn tampered_tarball_is_refetched_once_and_not_reverified(linux: Fixture) {
    linux.seed_tarball(b"tampered");
    let runner = linux.stub_runner().failing_on("gpg-verify");
    let downloader = linux.stub_downloader();

    let mut stderr = Vec::new();
    let action =
        ensure_built(&linux.context, toolkit(&runner, &downloader), &mut stderr).expect("pipeline");

    assert_eq!(action, BuildAction::Built { refetched: true });
    assert_eq!(downloader.tarball_downloads(), 1);
    assert_eq!(runner.count("gpg-verify"), 1);
    assert_eq!(runner.count("install"), 1);
    let stderr = String::from_utf8(stderr).expect("UTF-8");
    assert_eq!(stderr.matches(WARNING).count(), 1);
    assert!(
        linux
            .workspace()
            .source_tree(&linux.context.release)
            .join("CMakeLists.txt")
            .is_file()
    );
}

#[rstest]
fn empty_workspace_downloads_without_running_gpg(linux: Fixture) {
    let runner = linux.stub_runner();
    let downloader = linux.stub_downloader();

    let mut stderr = Vec::new();
    let action =
        ensure_built(&linux.context, toolkit(&runner, &downloader), &mut stderr).expect("pipeline");

    assert_eq!(action, BuildAction::Built { refetched: true });
    assert_eq!(runner.prefixes(), ["configure", "build", "install"]);
    assert_eq!(
        downloader.urls(),
        [
            linux.context.release.signature_url(),
            linux.context.release.tarball_url()
        ]
    );
}

#[rstest]
fn second_invocation_does_no_work(linux: Fixture) {
    let runner = linux.stub_runner();
    let downloader = linux.stub_downloader();
    let mut stderr = Vec::new();
    ensure_built(&linux.context, toolkit(&runner, &downloader), &mut stderr).expect("first run");
    let steps_after_first = runner.steps().len();
    let urls_after_first = downloader.urls().len();

    let action = ensure_built(&linux.context, toolkit(&runner, &downloader), &mut stderr)
        .expect("second run");

    assert_eq!(action, BuildAction::AlreadyBuilt);
    assert_eq!(runner.steps().len(), steps_after_first);
    assert_eq!(downloader.urls().len(), urls_after_first);
}

#[rstest]
fn build_failure_is_fatal(linux: Fixture) {
    let runner = linux.stub_runner().failing_on("build");
    let downloader = linux.stub_downloader();

    let mut stderr = Vec::new();
    let err = ensure_built(&linux.context, toolkit(&runner, &downloader), &mut stderr)
        .expect_err("build fails");

    assert!(matches!(err, VendorError::StepFailed { command, .. } if command == "ninja"));
    assert_eq!(runner.count("install"), 0);
    assert!(!linux.workspace().is_already_built(Platform::Linux));
}

#[rstest]
fn install_into_unexpected_lib_dir_still_reports_configuration(linux: Fixture) {
    let elsewhere = linux.workspace().root().join("lib/libcares.a");
    let runner = StubRunner::new().installing(&elsewhere);
    let downloader = linux.stub_downloader();

    let mut stderr = Vec::new();
    let output = ensure_and_describe(&linux.context, toolkit(&runner, &downloader), &mut stderr)
        .expect("configuration is emitted");

    assert_eq!(runner.prefixes(), ["configure", "build", "install"]);
    assert!(elsewhere.is_file());
    let link = output.link_configs.first().expect("link config");
    assert_eq!(
        link.link_search_paths,
        [linux.workspace().lib_dir(Platform::Linux).to_string()]
    );
}

#[rstest]
fn tarball_download_failure_is_fatal(linux: Fixture) {
    let runner = linux.stub_runner();
    let mut downloader = MockReleaseDownloader::new();
    downloader.expect_download().returning(|url, dest| {
        if url.ends_with(".asc") {
            std::fs::write(dest, b"signature").map_err(crate::fetch::DownloadError::Io)
        } else {
            Err(crate::fetch::DownloadError::NotFound {
                url: url.to_owned(),
            })
        }
    });
    let toolkit = Toolkit {
        runner: &runner,
        downloader: &downloader,
        extractor: &TarGzExtractor,
    };

    let mut stderr = Vec::new();
    let err = ensure_built(&linux.context, toolkit, &mut stderr).expect_err("404");

    assert!(matches!(
        err,
        VendorError::Download(crate::fetch::DownloadError::NotFound { .. })
    ));
    assert!(runner.steps().is_empty());
}

#[rstest]
fn quiet_suppresses_progress_but_not_warnings(mut linux: Fixture) {
    linux.context.quiet = true;
    let runner = linux.stub_runner();
    let downloader = linux.stub_downloader();

    let mut stderr = Vec::new();
    ensure_built(&linux.context, toolkit(&runner, &downloader), &mut stderr).expect("pipeline");

    assert_eq!(String::from_utf8(stderr).expect("UTF-8"), format!("{WARNING}\n"));
}

#[rstest]
fn empty_workspace_reports_lib64_configuration(linux: Fixture) {
    let runner = linux.stub_runner();
    let downloader = linux.stub_downloader();

    let mut stderr = Vec::new();
    let output = ensure_and_describe(&linux.context, toolkit(&runner, &downloader), &mut stderr)
        .expect("pipeline");

    let link = output.link_configs.first().expect("link config");
    assert_eq!(link.link_libs, ["cares"]);
    assert_eq!(
        link.link_search_paths,
        [linux.workspace().root().join("lib64").to_string()]
    );
    assert_eq!(output.vars.cc, "gcc");
}

#[rstest]
fn built_workspace_reports_same_configuration(linux: Fixture) {
    let runner = linux.stub_runner();
    let downloader = linux.stub_downloader();
    let mut stderr = Vec::new();
    let first = ensure_and_describe(&linux.context, toolkit(&runner, &downloader), &mut stderr)
        .expect("first run");

    let second = ensure_and_describe(&linux.context, toolkit(&runner, &downloader), &mut stderr)
        .expect("second run");

    assert_eq!(first, second);
}

#[rstest]
#[case::windows(Platform::Windows)]
#[case::linux(Platform::Linux)]
#[case::macos(Platform::MacOs)]
fn compiler_override_is_reported_on_every_platform(#[case] platform: Platform) {
    let mut fixture = fixture_for(platform);
    fixture.context.environment = BuildEnvironment::new(BTreeMap::from([(
        "CC".to_owned(),
        "clang-17".to_owned(),
    )]));
    fixture.seed_installed_library();

    let mut runner = MockCommandRunner::new();
    runner.expect_run().never();
    let mut downloader = MockReleaseDownloader::new();
    downloader.expect_download().never();
    let toolkit = Toolkit {
        runner: &runner,
        downloader: &downloader,
        extractor: &TarGzExtractor,
    };

    let mut stderr = Vec::new();
    let output = ensure_and_describe(&fixture.context, toolkit, &mut stderr).expect("pipeline");
    assert_eq!(output.vars.cc, "clang-17");
}
