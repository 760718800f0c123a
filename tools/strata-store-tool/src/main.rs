use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use strata_storage::{FileDevice, StorageDevice};

// Image contents carry no format imposed by the storage core; this tool only
// creates fixed-capacity images and moves raw bytes in and out of them.

const DUMP_BYTES_PER_LINE: usize = 16;
const FILL_CHUNK_BYTES: usize = 64 * 1024;

#[derive(Parser, Debug)]
#[command(
    name = "strata-store-tool",
    about = "Create, fill and dump fixed-capacity storage image files."
)]
struct Args {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Create a new zero-filled image of the given capacity
    Create {
        image: PathBuf,

        /// Image capacity in bytes
        #[arg(long, value_name = "BYTES")]
        capacity: u32,

        /// Allow overwriting an existing image
        #[arg(long, action = clap::ArgAction::SetTrue)]
        force: bool,
    },

    /// Overwrite a byte range with a repeated value
    Fill {
        image: PathBuf,

        /// Start address
        #[arg(long, value_name = "ADDR", default_value_t = 0)]
        addr: u32,

        /// Number of bytes to fill (defaults to the rest of the image)
        #[arg(long, value_name = "BYTES")]
        len: Option<u32>,

        /// Fill value
        #[arg(long, value_name = "BYTE", default_value_t = 0)]
        byte: u8,
    },

    /// Write hex-encoded bytes at an address
    Write {
        image: PathBuf,

        /// Destination address
        #[arg(long, value_name = "ADDR")]
        addr: u32,

        /// Bytes to write, hex-encoded (e.g. "deadbeef")
        #[arg(long, value_name = "HEX")]
        data: String,
    },

    /// Hex dump of a byte range
    Dump {
        image: PathBuf,

        /// Start address
        #[arg(long, value_name = "ADDR", default_value_t = 0)]
        addr: u32,

        /// Number of bytes to dump (defaults to the rest of the image)
        #[arg(long, value_name = "BYTES")]
        len: Option<u32>,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    match args.cmd {
        Cmd::Create {
            image,
            capacity,
            force,
        } => create(&image, capacity, force),
        Cmd::Fill {
            image,
            addr,
            len,
            byte,
        } => fill(&image, addr, len, byte),
        Cmd::Write { image, addr, data } => write(&image, addr, &data),
        Cmd::Dump { image, addr, len } => dump(&image, addr, len),
    }
}

fn create(path: &Path, capacity: u32, force: bool) -> anyhow::Result<()> {
    if capacity == 0 {
        bail!("capacity must be non-zero");
    }

    if force {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("create {}", path.display()))?;
        file.set_len(u64::from(capacity))
            .context("set image length")?;
        FileDevice::from_file(file).context("open created image")?;
    } else {
        FileDevice::create(path, capacity)
            .with_context(|| format!("create {} (use --force to overwrite)", path.display()))?;
    }

    eprintln!("created {} ({capacity} bytes)", path.display());
    Ok(())
}

fn fill(path: &Path, addr: u32, len: Option<u32>, byte: u8) -> anyhow::Result<()> {
    let mut device = open_image(path)?;
    let len = resolve_len(&device, addr, len)?;

    let chunk = vec![byte; FILL_CHUNK_BYTES.min(len as usize)];
    let mut written = 0u32;
    while written < len {
        let n = chunk.len().min((len - written) as usize);
        device
            .write_at(addr + written, &chunk[..n])
            .with_context(|| format!("write at {}", addr + written))?;
        written += n as u32;
    }

    device.sync().context("sync image")?;
    eprintln!("filled [{addr}, {}) with {byte:#04x}", addr + len);
    Ok(())
}

fn write(path: &Path, addr: u32, data: &str) -> anyhow::Result<()> {
    let bytes = parse_hex(data)?;
    if bytes.is_empty() {
        bail!("no bytes to write");
    }

    let mut device = open_image(path)?;
    device
        .write_at(addr, &bytes)
        .with_context(|| format!("write {} bytes at {addr}", bytes.len()))?;
    device.sync().context("sync image")?;

    eprintln!("wrote {} bytes at {addr}", bytes.len());
    Ok(())
}

fn dump(path: &Path, addr: u32, len: Option<u32>) -> anyhow::Result<()> {
    let mut device = open_image(path)?;
    let len = resolve_len(&device, addr, len)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut line = [0u8; DUMP_BYTES_PER_LINE];
    let mut offset = 0u32;
    while offset < len {
        let n = DUMP_BYTES_PER_LINE.min((len - offset) as usize);
        device
            .read_at(addr + offset, &mut line[..n])
            .with_context(|| format!("read at {}", addr + offset))?;
        write_dump_line(&mut out, addr + offset, &line[..n])?;
        offset += n as u32;
    }

    Ok(())
}

fn write_dump_line(out: &mut impl io::Write, addr: u32, bytes: &[u8]) -> io::Result<()> {
    write!(out, "{addr:08x} ")?;
    for i in 0..DUMP_BYTES_PER_LINE {
        match bytes.get(i) {
            Some(b) => write!(out, " {b:02x}")?,
            None => write!(out, "   ")?,
        }
    }
    write!(out, "  |")?;
    for b in bytes {
        let ch = if b.is_ascii_graphic() || *b == b' ' {
            *b as char
        } else {
            '.'
        };
        write!(out, "{ch}")?;
    }
    writeln!(out, "|")
}

fn open_image(path: &Path) -> anyhow::Result<FileDevice> {
    FileDevice::open(path).with_context(|| format!("open {}", path.display()))
}

fn resolve_len(device: &FileDevice, addr: u32, len: Option<u32>) -> anyhow::Result<u32> {
    let capacity = device.capacity();
    if addr > capacity {
        bail!("address {addr} past image capacity {capacity}");
    }
    let rest = capacity - addr;
    let len = len.unwrap_or(rest);
    if len > rest {
        bail!("range [{addr}, {addr}+{len}) past image capacity {capacity}");
    }
    Ok(len)
}

fn parse_hex(s: &str) -> anyhow::Result<Vec<u8>> {
    let s: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    if s.len() % 2 != 0 {
        bail!("hex data must have an even number of digits");
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&s[i..i + 2], 16)
                .with_context(|| format!("invalid hex byte {:?}", &s[i..i + 2]))
        })
        .collect()
}
