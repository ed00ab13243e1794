//! Typed gcloud invocations.
//!
//! Each request serializes to an argument vector handed straight to the
//! process, so no value is ever re-parsed by a shell.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use crate::executor::GCLOUD;

const REDACTED: &str = "[REDACTED]";

/// A gcloud invocation: arguments after the program name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcloudCommand {
    args: Vec<String>,
    /// Displayed stand-ins for arguments carrying secrets, by index.
    masked: Vec<(usize, String)>,
}

impl GcloudCommand {
    pub fn new(args: Vec<String>) -> Self {
        Self {
            args,
            masked: Vec::new(),
        }
    }

    /// Display `shown` in place of the argument at `index`.
    pub fn masking(mut self, index: usize, shown: String) -> Self {
        self.masked.push((index, shown));
        self
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// True when `arg` is one of the arguments.
    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }

    /// Shell-quoted one-line rendering with `program` as the executable.
    pub fn render<'a>(&'a self, program: &'a str) -> Rendered<'a> {
        Rendered { program, cmd: self }
    }

    fn shown(&self, index: usize) -> &str {
        self.masked
            .iter()
            .find(|(i, _)| *i == index)
            .map_or(self.args[index].as_str(), |(_, shown)| shown.as_str())
    }
}

/// A [`GcloudCommand`] as printed in transcripts and dry runs.
pub struct Rendered<'a> {
    program: &'a str,
    cmd: &'a GcloudCommand,
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&shell_quote(self.program))?;
        for index in 0..self.cmd.args.len() {
            write!(f, " {}", shell_quote(self.cmd.shown(index)))?;
        }
        Ok(())
    }
}

impl fmt::Display for GcloudCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.render(GCLOUD), f)
    }
}

fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=,@%+".contains(c));
    if plain {
        arg.to_owned()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

// ── Cloud Build ──

/// `gcloud builds submit` with the git credentials and target image passed
/// as Cloud Build substitutions.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub config_path: String,
    pub git_username: String,
    pub git_token: SecretString,
    pub image: String,
}

impl BuildRequest {
    pub fn to_command(&self) -> GcloudCommand {
        let token = self.git_token.expose_secret();
        let cmd = GcloudCommand::new(args([
            "builds",
            "submit",
            &format!("--config={}", self.config_path),
            &self.substitutions(token),
        ]));

        if token.is_empty() {
            cmd
        } else {
            cmd.masking(3, self.substitutions(REDACTED))
        }
    }

    fn substitutions(&self, token: &str) -> String {
        format!(
            "--substitutions=_GIT_USERNAME={user},_GIT_TOKEN={token},_IMAGE={image}",
            user = self.git_username,
            image = self.image,
        )
    }
}

// ── Cloud Run ──

/// `gcloud run deploy` of an already built image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployRequest {
    pub service: String,
    pub image: String,
    pub env_vars_file: String,
    pub platform: String,
    pub region: String,
    pub service_account: String,
    /// Env var names mounted from Secret Manager as `NAME=NAME:latest`.
    pub secrets: Vec<String>,
}

impl DeployRequest {
    pub fn to_command(&self) -> GcloudCommand {
        let mut cmd = args([
            "run",
            "deploy",
            &self.service,
            "--image",
            &self.image,
            "--env-vars-file",
            &self.env_vars_file,
            "--platform",
            &self.platform,
            "--region",
            &self.region,
            "--service-account",
            &self.service_account,
            "--quiet",
        ]);

        if let Some(flag) = set_secrets_flag(&self.secrets) {
            cmd.push(flag);
        }

        GcloudCommand::new(cmd)
    }
}

/// `--set-secrets=A=A:latest,B=B:latest`, or `None` for no secrets.
pub fn set_secrets_flag(secrets: &[String]) -> Option<String> {
    if secrets.is_empty() {
        return None;
    }

    let bindings = secrets
        .iter()
        .map(|s| format!("{s}={s}:latest"))
        .collect::<Vec<_>>()
        .join(",");
    Some(format!("--set-secrets={bindings}"))
}

/// `gcloud run services update-traffic` sending all traffic to the latest revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficRequest {
    pub service: String,
    pub platform: String,
    pub region: String,
}

impl TrafficRequest {
    pub fn to_command(&self) -> GcloudCommand {
        GcloudCommand::new(args([
            "run",
            "services",
            "update-traffic",
            &self.service,
            "--to-latest",
            "--platform",
            &self.platform,
            "--region",
            &self.region,
            "--quiet",
        ]))
    }
}

// ── Helper ──

fn args<const N: usize>(a: [&str; N]) -> Vec<String> {
    a.iter().map(|s| (*s).to_owned()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deploy(secrets: &[&str]) -> DeployRequest {
        DeployRequest {
            service: "svc".to_owned(),
            image: "gcr.io/proj/svc:1700000000".to_owned(),
            env_vars_file: "configs/staging.env.yaml".to_owned(),
            platform: "managed".to_owned(),
            region: "us-central1".to_owned(),
            service_account: "runner@proj.iam.gserviceaccount.com".to_owned(),
            secrets: secrets.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    #[test]
    fn build_command_args() {
        let request = BuildRequest {
            config_path: "build/package/cloudbuild.yaml".to_owned(),
            git_username: "bot".to_owned(),
            git_token: SecretString::from("ghp_abc".to_owned()),
            image: "gcr.io/proj/svc:v1".to_owned(),
        };

        let cmd = request.to_command();
        assert_eq!(
            cmd.args(),
            [
                "builds",
                "submit",
                "--config=build/package/cloudbuild.yaml",
                "--substitutions=_GIT_USERNAME=bot,_GIT_TOKEN=ghp_abc,_IMAGE=gcr.io/proj/svc:v1",
            ]
        );
    }

    #[test]
    fn build_command_display_redacts_token() {
        let request = BuildRequest {
            config_path: "cloudbuild.yaml".to_owned(),
            git_username: "bot".to_owned(),
            git_token: SecretString::from("ghp_abc".to_owned()),
            image: "gcr.io/proj/svc:v1".to_owned(),
        };

        let shown = request.to_command().to_string();
        assert!(!shown.contains("ghp_abc"));
        assert!(shown.contains("_GIT_TOKEN=[REDACTED]"));
        assert!(shown.starts_with("gcloud builds submit"));
    }

    #[test]
    fn redaction_leaves_other_substitutions_intact() {
        let request = BuildRequest {
            config_path: "cloudbuild.yaml".to_owned(),
            git_username: "proj".to_owned(),
            git_token: SecretString::from("proj".to_owned()),
            image: "gcr.io/proj/svc:v1".to_owned(),
        };

        assert_eq!(
            request.to_command().to_string(),
            "gcloud builds submit --config=cloudbuild.yaml \
             '--substitutions=_GIT_USERNAME=proj,_GIT_TOKEN=[REDACTED],_IMAGE=gcr.io/proj/svc:v1'"
        );
    }

    #[test]
    fn render_uses_the_given_program() {
        let cmd = GcloudCommand::new(args(["run", "services", "list"]));
        assert_eq!(
            cmd.render("/opt/google cloud/bin/gcloud").to_string(),
            "'/opt/google cloud/bin/gcloud' run services list"
        );
    }

    #[test]
    fn empty_token_is_not_redacted_everywhere() {
        let request = BuildRequest {
            config_path: "cloudbuild.yaml".to_owned(),
            git_username: String::new(),
            git_token: SecretString::from("".to_owned()),
            image: "img".to_owned(),
        };

        let shown = request.to_command().to_string();
        assert!(!shown.contains(REDACTED));
        assert!(shown.contains("_GIT_USERNAME=,_GIT_TOKEN=,_IMAGE=img"));
    }

    #[test]
    fn deploy_command_with_secrets() {
        let cmd = deploy(&["A", "B"]).to_command();

        assert!(cmd.has_arg("--set-secrets=A=A:latest,B=B:latest"));
        assert_eq!(cmd.args().last().unwrap(), "--set-secrets=A=A:latest,B=B:latest");
        assert!(cmd.to_string().contains("--set-secrets=A=A:latest,B=B:latest"));
    }

    #[test]
    fn deploy_command_without_secrets() {
        let cmd = deploy(&[]).to_command();

        assert!(!cmd.args().iter().any(|a| a.starts_with("--set-secrets")));
        assert_eq!(
            cmd.args(),
            [
                "run",
                "deploy",
                "svc",
                "--image",
                "gcr.io/proj/svc:1700000000",
                "--env-vars-file",
                "configs/staging.env.yaml",
                "--platform",
                "managed",
                "--region",
                "us-central1",
                "--service-account",
                "runner@proj.iam.gserviceaccount.com",
                "--quiet",
            ]
        );
    }

    #[test]
    fn traffic_command_targets_latest() {
        let cmd = TrafficRequest {
            service: "svc".to_owned(),
            platform: "managed".to_owned(),
            region: "europe-west1".to_owned(),
        }
        .to_command();

        assert_eq!(
            cmd.to_string(),
            "gcloud run services update-traffic svc --to-latest --platform managed --region europe-west1 --quiet"
        );
    }

    #[test]
    fn display_quotes_unsafe_arguments() {
        let cmd = GcloudCommand::new(args(["run", "deploy", "", "my service", "it's"]));
        assert_eq!(
            cmd.to_string(),
            r"gcloud run deploy '' 'my service' 'it'\''s'"
        );
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn secrets_flag_has_one_binding_per_name(
                names in proptest::collection::vec("[A-Z][A-Z0-9_]{0,15}", 1..6),
            ) {
                let flag = set_secrets_flag(&names).unwrap();
                let bindings = flag.strip_prefix("--set-secrets=").unwrap();

                prop_assert!(!bindings.ends_with(','));
                let parts: Vec<&str> = bindings.split(',').collect();
                prop_assert_eq!(parts.len(), names.len());
                for (part, name) in parts.iter().zip(&names) {
                    prop_assert_eq!(*part, format!("{name}={name}:latest"));
                }
            }
        }
    }
}
