use std::io::{BufRead, BufReader, Read};

/// reads whitespace-separated integers; the first bad token is reported with its line
pub fn read_values<R: Read>(reader: R) -> anyhow::Result<Vec<i64>> {
    let mut values = Vec::new();
    for (i, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        for token in line.split_whitespace() {
            let v: i64 = token
                .parse()
                .map_err(|_| anyhow::anyhow!("line {}: not an integer: {token}", i + 1))?;
            values.push(v);
        }
    }
    Ok(values)
}
