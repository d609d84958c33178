use lambda_http::{run, service_fn, tracing, Body, Error, Request, RequestExt, Response};
use parking_lot::Mutex;
use serde_json::json;
use std::io;
use std::io::{ErrorKind, Write};
use std::str::from_utf8;
use std::sync::Arc;
use swh::output::Output;
use swh::{run_project, ProjectFlags};
use uuid::Uuid;

async fn function_handler(event: Request) -> Result<Response<Body>, Error> {
    let input = match event.body() {
        Body::Empty => "",
        Body::Text(text) => text.as_str(),
        Body::Binary(_) => {
            return error_response(415, "Input must be sent as JSON text.");
        }
    }
    .as_bytes();

    let mut flags = ProjectFlags::empty();
    if event
        .query_string_parameters_ref()
        .and_then(|params| params.first("summary"))
        .is_some_and(|value| value == "true")
    {
        flags.insert(ProjectFlags::SUMMARY_OUTPUT);
    }

    let output = LambdaOutput::new();

    let resp = match run_project(input, &output, &flags) {
        Ok(_) => Response::builder()
            .status(200)
            .header("Content-Type", "text/plain")
            .body(output.into())
            .map_err(Box::new)?,
        Err(e) => return error_response(422, &e.to_string()),
    };

    Ok(resp)
}

fn error_response(status: u16, detail: &str) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(&json!({
            "errors": [{"id": Uuid::new_v4(), "status": status.to_string(), "detail": detail}]
        }))?))
        .map_err(Box::new)?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    run(service_fn(function_handler)).await
}

/// This output uses a shared string that individual "file" writers (the FileLikeStringWriter type)
/// can write to - this string can then be used as the response body for the Lambda.
#[derive(Debug)]
struct LambdaOutput(Arc<Mutex<String>>);

impl LambdaOutput {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(String::new())))
    }
}

impl Output for &LambdaOutput {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        Ok(FileLikeStringWriter::new(
            self.0.clone(),
            location_key,
            file_extension,
        ))
    }
}

impl From<LambdaOutput> for Body {
    fn from(value: LambdaOutput) -> Self {
        match Arc::try_unwrap(value.0) {
            Ok(string) => string.into_inner().into(),
            // a writer is still holding on to the string
            Err(shared) => shared.lock().clone().into(),
        }
    }
}

/// Represents a writer for an individual "file".
struct FileLikeStringWriter {
    string: Arc<Mutex<String>>,
    location_key: String,
    file_extension: String,
    has_output_file_header: bool,
}

impl FileLikeStringWriter {
    fn new(string: Arc<Mutex<String>>, location_key: &str, file_extension: &str) -> Self {
        Self {
            string,
            location_key: location_key.to_string(),
            file_extension: file_extension.to_string(),
            has_output_file_header: false,
        }
    }
}

impl Write for FileLikeStringWriter {
    /// Writes out bytes to this "file" (part of the wider LambdaOutput string), with a header at
    /// the start of each file naming it.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let utf8 = from_utf8(buf).map_err(|_| {
            io::Error::new(ErrorKind::InvalidData, "Tried to write out invalid UTF-8.")
        })?;

        let mut output_string = self.string.lock();
        if !self.has_output_file_header {
            if !output_string.is_empty() {
                output_string.push_str("\n\n");
            }
            output_string.push_str(&format!(
                "Writing out file '{}.{}':\n\n",
                self.location_key, self.file_extension
            ));
            self.has_output_file_header = true;
        }
        output_string.push_str(utf8);

        Ok(utf8.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
