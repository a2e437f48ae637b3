// Copyright (c) 2022 10X Genomics, Inc. All rights reserved.

// Helpers for KEY=VALUE argument recognition.

use io_utils::path_exists;
use std::fs::{remove_file, File};
use string_utils::TextUtils;

// Test a file for writeability by writing and then deleting it.

pub fn test_writeable(val: &str) -> Result<(), String> {
    if File::create(val).is_err() {
        let mut msg = format!(
            "\nYou've specified an output file\n{}\nthat cannot be written.\n",
            val
        );
        if val.contains('/') {
            let dir = val.rev_before("/");
            let state = if path_exists(dir) {
                "exists"
            } else {
                "does not exist"
            };
            msg += &format!("Note that the path {} {}.\n", dir, state);
        }
        return Err(msg);
    }
    remove_file(val).map_err(|_| format!("\nCould not remove test file {}.\n", val))
}

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓

// Simple arguments.  We test for e.g. SVG or SVG=, the latter to allow for the case where the
// argument has been set by an environment variable.

pub fn is_simple_arg(arg: &str, x: &str) -> Result<bool, String> {
    if arg == x || arg == format!("{}=", x) {
        return Ok(true);
    } else if arg.starts_with(&format!("{}=", x)) {
        return Err(format!(
            "\nYour command line includes \"{}\", which is not a valid argument.\n\
             Perhaps you meant \"{}\".\n",
            arg, x
        ));
    }
    Ok(false)
}

// Usize arguments.  We require that these are nonnegative integers.

pub fn is_usize_arg(arg: &str, x: &str) -> Result<bool, String> {
    let bad = || {
        format!(
            "\nYour command line includes \"{}\", which is not a valid argument.\n\
             Perhaps you meant \"{}=n\", where n >= 0 is an integer.\n",
            arg, x
        )
    };
    if arg == x {
        return Err(bad());
    } else if arg.starts_with(&format!("{}=", x)) {
        if arg.after(&format!("{}=", x)).parse::<usize>().is_ok() {
            return Ok(true);
        }
        return Err(bad());
    }
    Ok(false)
}

// Floating point arguments.  Infinities and NaN are not accepted.

pub fn is_f64_arg(arg: &str, x: &str) -> Result<bool, String> {
    let bad = || {
        format!(
            "\nYour command line includes \"{}\", which is not a valid argument.\n\
             Perhaps you meant \"{}=n\", where n is a floating point number.\n",
            arg, x
        )
    };
    if arg == x {
        return Err(bad());
    } else if arg.starts_with(&format!("{}=", x)) {
        match arg.after(&format!("{}=", x)).parse::<f64>() {
            Ok(v) if v.is_finite() => return Ok(true),
            _ => return Err(bad()),
        }
    }
    Ok(false)
}

pub fn is_string_arg(arg: &str, x: &str) -> Result<bool, String> {
    if arg == x {
        return Err(format!(
            "\nYour command line includes \"{}\", which is not a valid argument.\n\
             Perhaps you meant \"{}=s\" for some string s.\n",
            arg, x
        ));
    } else if arg.starts_with(&format!("{}=", x)) {
        if arg.after(&format!("{}=", x)).is_empty() {
            return Err(format!(
                "\nYour command line includes \"{}\", which needs a value after the \
                 equals sign.\n",
                arg
            ));
        }
        return Ok(true);
    }
    Ok(false)
}
