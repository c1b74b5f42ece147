use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use clap::{crate_version, value_parser, Arg, ArgAction, ArgMatches, Command};
use log::{info, LevelFilter};

use ss_crypt::ss::{
    decrypt_file, encrypt_file, generate_keypair, read_private_key, read_public_key,
    write_private_key, write_public_key, SeededRandom, SsKeyPair,
};
use ss_crypt::util::{
    commit_staged, create_private_key_file, create_public_key_file, discard_staged, open_input,
    open_key_file, open_output, staging_path, CipherConfig, KeygenConfig,
};

fn cli() -> Command {
    let verbose = Arg::new("verbose")
        .long("verbose")
        .short('v')
        .action(ArgAction::SetTrue)
        .global(true)
        .help("report key material on stderr");

    let input = Arg::new("input")
        .long("input")
        .short('i')
        .action(ArgAction::Set)
        .value_parser(value_parser!(PathBuf))
        .help("input file (default: stdin)");

    let output = Arg::new("output")
        .long("output")
        .short('o')
        .action(ArgAction::Set)
        .value_parser(value_parser!(PathBuf))
        .help("output file (default: stdout)");

    Command::new("ss")
        .version(crate_version!())
        .about("Schmidt-Samoa key generation and file encryption")
        .subcommand_required(true)
        .arg(verbose)
        .subcommand(
            Command::new("keygen")
                .about("generate an SS public/private key pair")
                .arg(
                    Arg::new("bits")
                        .long("bits")
                        .short('b')
                        .action(ArgAction::Set)
                        .value_parser(value_parser!(u64))
                        .help("minimum bits needed for the public value n (default: 256)"),
                )
                .arg(
                    Arg::new("iterations")
                        .long("iterations")
                        .short('i')
                        .action(ArgAction::Set)
                        .value_parser(value_parser!(u32))
                        .help("Miller-Rabin iterations for testing primes (default: 50)"),
                )
                .arg(
                    Arg::new("pbfile")
                        .long("public")
                        .short('n')
                        .action(ArgAction::Set)
                        .value_parser(value_parser!(PathBuf))
                        .help("public key file (default: ss.pub)"),
                )
                .arg(
                    Arg::new("pvfile")
                        .long("private")
                        .short('d')
                        .action(ArgAction::Set)
                        .value_parser(value_parser!(PathBuf))
                        .help("private key file (default: ss.priv)"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .short('s')
                        .action(ArgAction::Set)
                        .value_parser(value_parser!(u64))
                        .help("random seed (default: current time)"),
                )
                .arg(
                    Arg::new("owner")
                        .long("owner")
                        .short('u')
                        .action(ArgAction::Set)
                        .help("key owner name (default: $USER)"),
                ),
        )
        .subcommand(
            Command::new("encrypt")
                .about("encrypt data with an SS public key")
                .arg(input.clone())
                .arg(output.clone())
                .arg(
                    Arg::new("key")
                        .long("key")
                        .short('n')
                        .action(ArgAction::Set)
                        .value_parser(value_parser!(PathBuf))
                        .help("public key file (default: ss.pub)"),
                ),
        )
        .subcommand(
            Command::new("decrypt")
                .about("decrypt data produced by encrypt")
                .arg(input)
                .arg(output)
                .arg(
                    Arg::new("key")
                        .long("key")
                        .short('n')
                        .action(ArgAction::Set)
                        .value_parser(value_parser!(PathBuf))
                        .help("private key file (default: ss.priv)"),
                ),
        )
}

fn keygen_config(m: &ArgMatches) -> KeygenConfig {
    let mut config = KeygenConfig::default();
    if let Some(bits) = m.get_one::<u64>("bits") {
        config = config.with_bits(*bits);
    }
    if let Some(iterations) = m.get_one::<u32>("iterations") {
        config = config.with_iterations(*iterations);
    }
    if let Some(path) = m.get_one::<PathBuf>("pbfile") {
        config = config.with_public_key(path);
    }
    if let Some(path) = m.get_one::<PathBuf>("pvfile") {
        config = config.with_private_key(path);
    }
    if let Some(seed) = m.get_one::<u64>("seed") {
        config = config.with_seed(*seed);
    }
    if let Some(owner) = m.get_one::<String>("owner") {
        config = config.with_owner(owner);
    }
    config
}

fn cipher_config(m: &ArgMatches, mut config: CipherConfig) -> CipherConfig {
    if let Some(path) = m.get_one::<PathBuf>("input") {
        config = config.with_input(path);
    }
    if let Some(path) = m.get_one::<PathBuf>("output") {
        config = config.with_output(path);
    }
    if let Some(path) = m.get_one::<PathBuf>("key") {
        config = config.with_key(path);
    }
    config
}

fn keygen(config: &KeygenConfig) -> anyhow::Result<()> {
    let seed = config.resolve_seed();
    let owner = config.resolve_owner();

    let mut rng = SeededRandom::from_seed(seed);
    let keypair = generate_keypair(config.bits, config.iterations, owner, &mut rng)
        .context("key generation failed")?;

    write_keypair(config, &keypair)?;

    info!("user = {}", keypair.public_key.owner);
    info!("p ({} bits) = {}", keypair.p.bits(), keypair.p);
    info!("q ({} bits) = {}", keypair.q.bits(), keypair.q);
    info!("n ({} bits) = {}", keypair.bit_length(), keypair.public_key.n);
    info!("pq ({} bits) = {}", keypair.private_key.bit_length(), keypair.private_key.pq);
    info!("d ({} bits) = {}", keypair.private_key.d.bits(), keypair.private_key.d);
    Ok(())
}

/// Write both key files to staging paths, then move them into place
/// An existing pair is left untouched unless both files were written
fn write_keypair(config: &KeygenConfig, keypair: &SsKeyPair) -> anyhow::Result<()> {
    let pub_staged = staging_path(&config.public_key);
    let priv_staged = staging_path(&config.private_key);

    if let Err(e) = stage_keypair(&pub_staged, &priv_staged, keypair) {
        discard_staged(&pub_staged);
        discard_staged(&priv_staged);
        return Err(e);
    }

    let (pub_path, priv_path) = (&config.public_key, &config.private_key);
    commit_staged(&priv_staged, priv_path)
        .with_context(|| format!("can't replace private key file {}", priv_path.display()))?;
    commit_staged(&pub_staged, pub_path)
        .with_context(|| format!("can't replace public key file {}", pub_path.display()))?;
    Ok(())
}

fn stage_keypair(pub_path: &Path, priv_path: &Path, keypair: &SsKeyPair) -> anyhow::Result<()> {
    let mut priv_file = create_private_key_file(priv_path)
        .with_context(|| format!("can't open private key file {}", priv_path.display()))?;
    let mut pub_file = create_public_key_file(pub_path)
        .with_context(|| format!("can't open public key file {}", pub_path.display()))?;

    write_private_key(&mut priv_file, &keypair.private_key)?;
    write_public_key(&mut pub_file, &keypair.public_key)?;
    Ok(())
}

fn encrypt(config: &CipherConfig) -> anyhow::Result<()> {
    let key_file = open_key_file(&config.key)
        .with_context(|| format!("can't open public key file {}", config.key.display()))?;
    let public_key = read_public_key(key_file)
        .with_context(|| format!("malformed public key file {}", config.key.display()))?;

    info!("user = {}", public_key.owner);
    info!("n ({} bits) = {}", public_key.bit_length(), public_key.n);

    let input = open_input(config.input.as_deref()).context("can't open input")?;
    let output = open_output(config.output.as_deref()).context("can't open output")?;
    encrypt_file(input, output, &public_key)?;
    Ok(())
}

fn decrypt(config: &CipherConfig) -> anyhow::Result<()> {
    let key_file = open_key_file(&config.key)
        .with_context(|| format!("can't open private key file {}", config.key.display()))?;
    let private_key = read_private_key(key_file)
        .with_context(|| format!("malformed private key file {}", config.key.display()))?;

    info!("pq ({} bits) = {}", private_key.bit_length(), private_key.pq);
    info!("d ({} bits) = {}", private_key.d.bits(), private_key.d);

    let input = open_input(config.input.as_deref()).context("can't open input")?;
    let output = open_output(config.output.as_deref()).context("can't open output")?;
    decrypt_file(input, output, &private_key)?;
    Ok(())
}

fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    match matches.subcommand() {
        Some(("keygen", m)) => keygen(&keygen_config(m)),
        Some(("encrypt", m)) => encrypt(&cipher_config(m, CipherConfig::for_encrypt())),
        Some(("decrypt", m)) => decrypt(&cipher_config(m, CipherConfig::for_decrypt())),
        Some((name, _)) => anyhow::bail!("unsupported command {}", name),
        None => anyhow::bail!("no command given"),
    }
}

fn main() {
    let matches = cli().get_matches();

    let verbose = matches.get_flag("verbose")
        || matches
            .subcommand()
            .is_some_and(|(_, m)| m.get_flag("verbose"));
    let level = if verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };
    env_logger::builder()
        .filter_level(level)
        .parse_default_env()
        .init();

    if let Err(e) = run(&matches) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
