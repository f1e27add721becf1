//! Model signing utility for GlycoCheck.
//!
//! Two subcommands:
//! - `keygen` creates an Ed25519 seed (0600) and optionally the public key
//! - `sign` writes `manifest.json` + `model.sig` for a model directory
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin sign_model -- keygen --out-seed <path> [--out-pub <path>] [--force]
//! GLYCOCHECK_MODEL_SIGNING_KEY_B64_FILE=<path> cargo run --bin sign_model -- sign <model_dir>
//! ```
//!
//! The app verifies with the base64 public key named by
//! `GLYCOCHECK_MODEL_PUBKEY_B64_FILE`.

use std::env;
use std::fs;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use base64::engine::general_purpose;
use base64::Engine;
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use glycocheck::adapters::model::manifest::{
    unix_now, write_signed_manifest, ModelManifest, MANIFEST_FILE_NAME, SIGNATURE_FILE_NAME,
};
use glycocheck::adapters::model::MODEL_FILE_NAME;

const KEY_FILE_ENV: &str = "GLYCOCHECK_MODEL_SIGNING_KEY_B64_FILE";

const USAGE: &str = "Usage:\n  sign_model keygen --out-seed <path> [--out-pub <path>] [--force]\n  sign_model sign <model_dir>";

#[derive(Zeroize, ZeroizeOnDrop)]
struct Seed([u8; 32]);

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

enum Command {
    Keygen {
        out_seed: PathBuf,
        out_pub: Option<PathBuf>,
        force: bool,
    },
    Sign {
        model_dir: PathBuf,
    },
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Command> {
    match args.next().as_deref() {
        Some("keygen") => {
            let mut out_seed = None;
            let mut out_pub = None;
            let mut force = false;
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--out-seed" => out_seed = args.next().map(PathBuf::from),
                    "--out-pub" => out_pub = args.next().map(PathBuf::from),
                    "--force" => force = true,
                    _ => bail!("Unknown arg: {arg}\n{USAGE}"),
                }
            }
            let out_seed = out_seed.ok_or_else(|| anyhow!(USAGE))?;
            Ok(Command::Keygen {
                out_seed,
                out_pub,
                force,
            })
        }
        Some("sign") => {
            let model_dir = args.next().map(PathBuf::from).ok_or_else(|| anyhow!(USAGE))?;
            if let Some(extra) = args.next() {
                bail!("Unexpected arg: {extra}\n{USAGE}");
            }
            Ok(Command::Sign { model_dir })
        }
        _ => bail!(USAGE),
    }
}

fn write_file(path: &Path, contents: &[u8], mode: u32, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("Refusing to overwrite existing file {path:?}. Use --force.");
    }
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    let mut opts = fs::OpenOptions::new();
    opts.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        opts.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    let mut file = opts
        .open(path)
        .with_context(|| format!("Failed to open {path:?}"))?;
    file.write_all(contents)?;
    file.write_all(b"\n")?;
    Ok(())
}

fn keygen(out_seed: &Path, out_pub: Option<&Path>, force: bool) -> Result<()> {
    let mut seed = Seed([0u8; 32]);
    OsRng.fill_bytes(&mut seed.0);

    let verifying_key = SigningKey::from_bytes(&seed.0).verifying_key();
    let seed_b64 = Zeroizing::new(general_purpose::STANDARD.encode(seed.0));
    let pub_b64 = general_purpose::STANDARD.encode(verifying_key.as_bytes());

    write_file(out_seed, seed_b64.as_bytes(), 0o600, force)?;
    println!("Wrote signing seed (base64) to {out_seed:?}");

    if let Some(pub_path) = out_pub {
        // Public key is non-secret; allow read access.
        write_file(pub_path, pub_b64.as_bytes(), 0o644, force)?;
        println!("Wrote public key (base64) to {pub_path:?}");
    }
    println!("PUBKEY (hex)={}", to_hex(verifying_key.as_bytes()));
    Ok(())
}

fn read_signing_seed() -> Result<Seed> {
    let path = env::var(KEY_FILE_ENV)
        .map_err(|_| anyhow!("Missing signing key. Set {KEY_FILE_ENV} to the seed file."))?;
    let content = Zeroizing::new(
        fs::read_to_string(path.trim()).context("Failed reading signing key file")?,
    );

    let raw = Zeroizing::new(
        general_purpose::STANDARD
            .decode(content.trim())
            .context("Invalid base64 in signing key")?,
    );
    let bytes: [u8; 32] = raw.as_slice().try_into().map_err(|_| {
        anyhow!(
            "Signing key seed must be 32 bytes after base64 decode (got {})",
            raw.len()
        )
    })?;
    Ok(Seed(bytes))
}

fn sign(model_dir: &Path) -> Result<()> {
    let model_dir = if model_dir.is_file() {
        model_dir
            .parent()
            .ok_or_else(|| anyhow!("Model path has no parent directory"))?
    } else {
        model_dir
    };

    let model_path = model_dir.join(MODEL_FILE_NAME);
    let model_bytes =
        fs::read(&model_path).with_context(|| format!("No model artifact at {model_path:?}"))?;

    let seed = read_signing_seed()?;
    let signing_key = SigningKey::from_bytes(&seed.0);

    let mut nonce = [0u8; 16];
    OsRng.fill_bytes(&mut nonce);

    let manifest = ModelManifest::new(
        [(MODEL_FILE_NAME, model_bytes.as_slice())],
        unix_now(),
        nonce,
    );
    write_signed_manifest(model_dir, &signing_key, &manifest)?;

    println!("Signed manifest: {:?}", model_dir.join(MANIFEST_FILE_NAME));
    println!("Wrote signature: {:?}", model_dir.join(SIGNATURE_FILE_NAME));
    println!(
        "PUBKEY (hex)={}",
        to_hex(signing_key.verifying_key().as_bytes())
    );
    Ok(())
}

fn main() -> Result<()> {
    match parse_args(env::args().skip(1))? {
        Command::Keygen {
            out_seed,
            out_pub,
            force,
        } => keygen(&out_seed, out_pub.as_deref(), force),
        Command::Sign { model_dir } => sign(&model_dir),
    }
}
