//! Integer-with-unit CLI argument parsing: a trailing `k|K|m|M|g|G` suffix
//! multiplies by a binary unit (1024-based), matching `sizetoint`/`sizetoll`.

const KILOBYTE: i64 = 1024;
const MEGABYTE: i64 = KILOBYTE * KILOBYTE;
const GIGABYTE: i64 = KILOBYTE * MEGABYTE;

pub fn parse_sized_int(arg: &str) -> Result<i64, String> {
    let bytes = arg.as_bytes();
    if bytes.is_empty() {
        return Err("empty integer argument".to_string());
    }

    let last = bytes[bytes.len() - 1] as char;
    let (digits, mult) = if last.is_alphabetic() {
        let mult = match last {
            'k' | 'K' => KILOBYTE,
            'm' | 'M' => MEGABYTE,
            'g' | 'G' => GIGABYTE,
            _ => return Err(format!("unrecognized size suffix '{last}'")),
        };
        (&arg[..arg.len() - 1], mult)
    } else {
        (arg, 1)
    };

    let value: i64 = digits
        .parse()
        .map_err(|_| format!("'{arg}' is not a valid integer"))?;
    Ok(value * mult)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_integer() {
        assert_eq!(parse_sized_int("1000").unwrap(), 1000);
    }

    #[test]
    fn kilobyte_suffix() {
        assert_eq!(parse_sized_int("4k").unwrap(), 4096);
        assert_eq!(parse_sized_int("4K").unwrap(), 4096);
    }

    #[test]
    fn megabyte_and_gigabyte_suffixes() {
        assert_eq!(parse_sized_int("2m").unwrap(), 2 * 1024 * 1024);
        assert_eq!(parse_sized_int("1G").unwrap(), 1024 * 1024 * 1024);
    }

    #[test]
    fn rejects_unknown_suffix() {
        assert!(parse_sized_int("5x").is_err());
    }
}
