/*!
TSPLIB instance parsing plus the small set of file formats the solver reads and writes around a
run: starting tours (`.sol`), best-tour output (`probname.sol`), tour-edge dumps
(`probname_tour.x`), and coordinate dumps (`probname.xy`). Also generates seeded random Euclidean
instances for benchmarking without a TSPLIB file on hand.
*/

pub mod data_section;
pub mod error;
pub mod metadata;
pub mod random;

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use memmap2::Mmap;
use tsp_core::{instance::Instance, node::Node};

pub use error::ParserError;
pub use random::random_euclidean_instance;

/// Parses a TSPLIB-format symmetric TSP instance file.
pub fn parse_instance<P: AsRef<Path>>(path: P) -> Result<Instance, ParserError> {
    let file = File::open(path)?;
    // Safety: the file is not modified by any other handle for the duration of this call.
    let mmap = unsafe { Mmap::map(&file)? };

    let mut cursor = 0;
    let (mut meta, data_keyword) = metadata::parse_metadata(&mmap, &mut cursor)?;
    let lengths = data_section::parse_data_section(&mmap, &mut cursor, data_keyword, &mut meta)?;

    Ok(Instance::new(meta, lengths))
}

/// Reads a starting tour: first line `n`, then `n` integer node indices (1-based, TSPLIB
/// convention) giving a cyclic permutation.
pub fn read_tour<P: AsRef<Path>>(path: P) -> Result<Vec<Node>, ParserError> {
    let text = std::fs::read_to_string(path)?;
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());

    let n: usize = lines
        .next()
        .and_then(|l| l.trim().parse().ok())
        .ok_or(ParserError::MissingField("tour length"))?;

    let mut nodes = Vec::with_capacity(n);
    for line in lines {
        for tok in line.split_ascii_whitespace() {
            let one_based: usize = tok
                .parse()
                .map_err(|_| ParserError::InvalidValue { field: "tour node", value: tok.to_string() })?;
            nodes.push(Node(one_based - 1));
        }
    }

    if nodes.len() != n {
        return Err(ParserError::WrongTourLength { found: nodes.len(), expected: n });
    }
    Ok(nodes)
}

/// Writes `probname.sol`: `n` followed by one 1-based node index per line.
pub fn write_tour<P: AsRef<Path>>(path: P, tour: &[Node]) -> Result<(), ParserError> {
    let mut w = BufWriter::new(File::create(path)?);
    writeln!(w, "{}", tour.len())?;
    for node in tour {
        writeln!(w, "{}", node.0 + 1)?;
    }
    Ok(())
}

/// Writes `probname_tour.x`: one `u v 1.0` triple per tour edge (0-based node indices).
pub fn write_tour_edges<P: AsRef<Path>>(path: P, tour: &[Node]) -> Result<(), ParserError> {
    let mut w = BufWriter::new(File::create(path)?);
    writeln!(w, "{} {}", tour.len(), tour.len())?;
    let n = tour.len();
    for i in 0..n {
        let (u, v) = (tour[i], tour[(i + 1) % n]);
        writeln!(w, "{} {} 1.0", u.0, v.0)?;
    }
    Ok(())
}

/// Writes `probname.xy`: one `x y` coordinate pair per line, if the instance carries coordinates.
pub fn write_xy<P: AsRef<Path>>(path: P, coords: &[(f64, f64)]) -> Result<(), ParserError> {
    let mut w = BufWriter::new(File::create(path)?);
    writeln!(w, "{}", coords.len())?;
    for (x, y) in coords {
        writeln!(w, "{x} {y}")?;
    }
    Ok(())
}
