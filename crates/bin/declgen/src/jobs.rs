use std::io::Write;

use declgen_core::control::{ControlError, DeclgenControlPlane};
use tracing::info;

use crate::config::Job;

/// Runs one job; rendered text without an output path goes to stdout.
pub async fn run_job(control: &DeclgenControlPlane, job: Job) -> Result<(), ControlError> {
    let rendered = match job {
        Job::Enums(request) => {
            let report = control.generate_enums(request).await?;
            if let Some(path) = &report.output {
                info!(
                    output = %path.display(),
                    records = report.record_count,
                    "wrote enum declarations"
                );
            }
            report.rendered
        }
        Job::Docs(request) => {
            let report = control.scan_doc_pages(request).await?;
            if let Some(path) = &report.output {
                info!(
                    output = %path.display(),
                    pages = report.pages_scanned,
                    records = report.record_count,
                    "wrote documentation declarations"
                );
            }
            report.rendered
        }
    };

    if let Some(text) = rendered {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(text.as_bytes())
            .and_then(|()| stdout.flush())
            .map_err(|source| ControlError::Write {
                path: "<stdout>".into(),
                source,
            })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use declgen_core::control::{DocScanRequest, EmitMode, EnumGenerateRequest};

    #[tokio::test]
    async fn enum_job_writes_output_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("enums.lua");
        let output = dir.path().join("typings").join("enums.d.ts");
        std::fs::write(&input, "Color = {\n  RED = 1,\n}\n").expect("write listing");

        let job = Job::Enums(EnumGenerateRequest::new(&input).with_output(&output));
        run_job(&DeclgenControlPlane::new(), job)
            .await
            .expect("job should succeed");

        let written = std::fs::read_to_string(&output).expect("output should exist");
        assert_eq!(written, "declare enum Color {\n  RED = 1,\n}\n");
    }

    #[tokio::test]
    async fn streaming_docs_job_still_writes_output_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pages = dir.path().join("pages");
        std::fs::create_dir(&pages).expect("create pages dir");
        std::fs::write(
            pages.join("class_game.html"),
            r#"<tr class="memitem:a"><td class="memItemLeft">const int&#160;</td><td class="memItemRight">MaxPlayers = 4</td></tr>"#,
        )
        .expect("write page");
        let output = dir.path().join("game.d.ts");

        let job = Job::Docs(
            DocScanRequest::new(&pages)
                .with_mode(EmitMode::Stream)
                .with_output(&output),
        );
        run_job(&DeclgenControlPlane::new(), job)
            .await
            .expect("job should succeed");

        let written = std::fs::read_to_string(&output).expect("output should exist");
        assert_eq!(written, "declare const MaxPlayers {\n  MaxPlayers = 4,\n}\n");
    }
}
