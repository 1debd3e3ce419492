//! ADMIT submission client
//!
//! Reads an applicant JSON document, wraps it per the deployment's
//! authentication mode (HMAC envelope over TCP, or the bare object over
//! TLS), sends one framed request and prints the server's response.

use admit_protocol::{canonical_bytes, compute_tag, FrameCodec, SubmissionOutcome};
use anyhow::{bail, Context};
use bytes::Bytes;
use clap::Parser;
use futures::{SinkExt, StreamExt};
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use serde_json::{json, Value};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_util::codec::Framed;

/// ADMIT submission client
#[derive(Parser, Debug)]
#[command(name = "admit-client")]
#[command(about = "Submit a course application to an ADMIT server")]
#[command(version)]
struct Cli {
    /// Server address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:9000")]
    addr: String,

    /// Authentication mode: tag or channel
    #[arg(short, long, default_value = "tag")]
    mode: String,

    /// Shared secret for tag mode (falls back to ADMIT_SHARED_SECRET)
    #[arg(long)]
    secret: Option<String>,

    /// Applicant JSON document; stdin when omitted
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Client identifier sent with tag-mode submissions
    #[arg(long, default_value = "admit-client")]
    client_id: String,

    /// CA certificate bundle for channel mode (PEM)
    #[arg(long)]
    ca_cert: Option<PathBuf>,

    /// Skip server certificate verification (channel mode, low-trust
    /// deployments only)
    #[arg(long)]
    insecure: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let applicant = read_applicant(&cli.input)?;

    let outcome = match cli.mode.as_str() {
        "tag" => submit_tag(&cli, &applicant).await?,
        "channel" => submit_channel(&cli, &applicant).await?,
        other => bail!("unknown mode: {other} (expected \"tag\" or \"channel\")"),
    };

    match outcome {
        SubmissionOutcome::Ok { application_number } => {
            println!("Application submitted successfully.");
            println!("Your application number is: {application_number}");
            Ok(())
        }
        SubmissionOutcome::Error { message } => {
            eprintln!("Server returned error: {message}");
            std::process::exit(1);
        }
    }
}

fn read_applicant(input: &Option<PathBuf>) -> anyhow::Result<Value> {
    let content = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read applicant document from stdin")?;
            buf
        }
    };

    let applicant: Value =
        serde_json::from_str(&content).context("applicant document is not valid JSON")?;
    if !applicant.is_object() {
        bail!("applicant document must be a JSON object");
    }
    Ok(applicant)
}

async fn submit_tag(cli: &Cli, applicant: &Value) -> anyhow::Result<SubmissionOutcome> {
    let secret = cli
        .secret
        .clone()
        .or_else(|| std::env::var("ADMIT_SHARED_SECRET").ok())
        .context("tag mode needs a shared secret (--secret or ADMIT_SHARED_SECRET)")?;

    let canonical = canonical_bytes(applicant)?;
    let tag = compute_tag(secret.as_bytes(), &canonical);
    let payload = serde_json::to_vec(&json!({
        "applicant": applicant,
        "client_id": cli.client_id,
        "hmac": tag,
    }))?;

    let stream = TcpStream::connect(&cli.addr)
        .await
        .with_context(|| format!("failed to connect to {}", cli.addr))?;
    exchange(stream, payload).await
}

async fn submit_channel(cli: &Cli, applicant: &Value) -> anyhow::Result<SubmissionOutcome> {
    let payload = serde_json::to_vec(applicant)?;

    let tls_config = client_tls_config(cli)?;
    let connector = TlsConnector::from(Arc::new(tls_config));

    let host = cli
        .addr
        .split(':')
        .next()
        .context("invalid server address")?;
    let server_name =
        ServerName::try_from(host.to_string()).context("invalid server hostname")?;

    let tcp = TcpStream::connect(&cli.addr)
        .await
        .with_context(|| format!("failed to connect to {}", cli.addr))?;
    let stream = connector
        .connect(server_name, tcp)
        .await
        .context("TLS handshake failed")?;
    exchange(stream, payload).await
}

fn client_tls_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    if cli.insecure {
        let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
        return Ok(ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(danger::NoVerification(provider)))
            .with_no_client_auth());
    }

    let mut root_store = RootCertStore::empty();
    match &cli.ca_cert {
        Some(path) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            let mut reader = std::io::BufReader::new(file);
            for cert in rustls_pemfile::certs(&mut reader) {
                root_store
                    .add(cert.context("invalid CA certificate")?)
                    .context("failed to add CA certificate")?;
            }
        }
        None => {
            root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        }
    }

    Ok(ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth())
}

async fn exchange<S>(stream: S, payload: Vec<u8>) -> anyhow::Result<SubmissionOutcome>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut framed = Framed::new(stream, FrameCodec::new());
    framed.send(Bytes::from(payload)).await?;

    let response = framed
        .next()
        .await
        .context("no response from server")?
        .context("failed to read response")?;

    Ok(serde_json::from_slice(&response).context("undecodable response from server")?)
}

mod danger {
    //! Certificate verifier that accepts anything, for deployments where the
    //! client deliberately skips verification.

    use rustls::client::danger::{
        HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier,
    };
    use rustls::crypto::CryptoProvider;
    use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
    use rustls::{DigitallySignedStruct, SignatureScheme};
    use std::sync::Arc;

    #[derive(Debug)]
    pub struct NoVerification(pub Arc<CryptoProvider>);

    impl ServerCertVerifier for NoVerification {
        fn verify_server_cert(
            &self,
            _end_entity: &CertificateDer<'_>,
            _intermediates: &[CertificateDer<'_>],
            _server_name: &ServerName<'_>,
            _ocsp_response: &[u8],
            _now: UnixTime,
        ) -> Result<ServerCertVerified, rustls::Error> {
            Ok(ServerCertVerified::assertion())
        }

        fn verify_tls12_signature(
            &self,
            message: &[u8],
            cert: &CertificateDer<'_>,
            dss: &DigitallySignedStruct,
        ) -> Result<HandshakeSignatureValid, rustls::Error> {
            rustls::crypto::verify_tls12_signature(
                message,
                cert,
                dss,
                &self.0.signature_verification_algorithms,
            )
        }

        fn verify_tls13_signature(
            &self,
            message: &[u8],
            cert: &CertificateDer<'_>,
            dss: &DigitallySignedStruct,
        ) -> Result<HandshakeSignatureValid, rustls::Error> {
            rustls::crypto::verify_tls13_signature(
                message,
                cert,
                dss,
                &self.0.signature_verification_algorithms,
            )
        }

        fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
            self.0.signature_verification_algorithms.supported_schemes()
        }
    }
}
