use eyre::Result;

/// Indices of the x column and of every y column to decimate against it.
#[derive(Debug, PartialEq, Eq)]
pub struct Selection {
    pub x: usize,
    pub ys: Vec<usize>,
}

/// Splits the y column list on the input delimiter. With a tab delimiter a
/// literal `\t` in the list also separates columns.
pub fn split(ycols: &str, delimiter: u8) -> Vec<String> {
    let ycols = if delimiter == b'\t' {
        ycols.replace("\\t", "\t")
    } else {
        ycols.to_string()
    };
    ycols
        .split(delimiter as char)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Resolves column names or 1-based column numbers against the header row.
/// A lone `*` selects every column except x.
pub fn resolve(headers: &[String], xcol: &str, ycols: &[String]) -> Result<Selection> {
    if let Some(h) = headers.iter().find(|h| h.parse::<f64>().is_ok()) {
        eyre::bail!("numerical header entry found: {:?}, a header row is required", h);
    }
    if ycols.is_empty() {
        eyre::bail!("found no y-column value");
    }

    let x = lookup(headers, xcol, "x")?;
    let ys: Vec<usize> = if ycols.len() == 1 && ycols[0] == "*" {
        (0..headers.len()).filter(|&i| i != x).collect()
    } else {
        let mut ys = Vec::with_capacity(ycols.len());
        for y in ycols {
            let i = lookup(headers, y, "y")?;
            if i == x {
                eyre::bail!("found x-column {:?} within y-column values", headers[x]);
            }
            if !ys.contains(&i) {
                ys.push(i);
            }
        }
        ys
    };

    if ys.is_empty() {
        eyre::bail!("no y-columns left besides x-column {:?}", headers[x]);
    }
    Ok(Selection { x, ys })
}

fn lookup(headers: &[String], col: &str, axis: &str) -> Result<usize> {
    if let Ok(n) = col.parse::<usize>() {
        if n == 0 || n > headers.len() {
            eyre::bail!(
                "{} column number {} too large or zero. Have {} headers",
                axis,
                n,
                headers.len()
            );
        }
        return Ok(n - 1);
    }
    headers
        .iter()
        .position(|h| h == col)
        .ok_or_else(|| eyre::eyre!("{:?} is not in columns: {:?}", col, headers))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> Vec<String> {
        ["time", "x", "y", "z"].iter().map(|s| s.to_string()).collect()
    }

    fn cols(s: &[&str]) -> Vec<String> {
        s.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn split_on_delimiter() {
        assert_eq!(split("x,y, z", b','), cols(&["x", "y", "z"]));
        assert_eq!(split("x\ty", b'\t'), cols(&["x", "y"]));
        assert!(split("", b',').is_empty());
    }

    #[test]
    fn escaped_tab_splits_tab_delimited_lists() {
        assert_eq!(split("a\\tb", b'\t'), cols(&["a", "b"]));
        assert_eq!(split("a\\tb\tc", b'\t'), cols(&["a", "b", "c"]));
        assert_eq!(split("a\\tb", b','), cols(&["a\\tb"]));
    }

    #[test]
    fn by_name() {
        let sel = resolve(&headers(), "time", &cols(&["x", "z"])).unwrap();
        assert_eq!(sel, Selection { x: 0, ys: vec![1, 3] });
    }

    #[test]
    fn by_number() {
        let sel = resolve(&headers(), "1", &cols(&["3", "y"])).unwrap();
        assert_eq!(sel, Selection { x: 0, ys: vec![2] });
    }

    #[test]
    fn star_selects_all_but_x() {
        let sel = resolve(&headers(), "y", &cols(&["*"])).unwrap();
        assert_eq!(sel, Selection { x: 2, ys: vec![0, 1, 3] });
    }

    #[test]
    fn unknown_column() {
        let err = resolve(&headers(), "time", &cols(&["w"])).unwrap_err();
        assert!(err.to_string().contains("not in columns"));
    }

    #[test]
    fn out_of_range_number() {
        assert!(resolve(&headers(), "5", &cols(&["x"])).is_err());
        assert!(resolve(&headers(), "0", &cols(&["x"])).is_err());
    }

    #[test]
    fn x_among_y() {
        let err = resolve(&headers(), "time", &cols(&["x", "1"])).unwrap_err();
        assert!(err.to_string().contains("within y-column"));
    }

    #[test]
    fn empty_y_list() {
        assert!(resolve(&headers(), "time", &[]).is_err());
    }

    #[test]
    fn numeric_header() {
        let headers = cols(&["0.5", "1.0"]);
        let err = resolve(&headers, "1", &cols(&["2"])).unwrap_err();
        assert!(err.to_string().contains("numerical header"));
    }
}
