use crate::config::Opts;

use anyhow::Result;
use dialoguer::Confirm;

pub fn ask_confirm(opts: &Opts, msg: &str) -> Result<bool> {
    ask_confirm_default(opts, msg, false)
}

pub fn ask_confirm_default(opts: &Opts, msg: &str, default: bool) -> Result<bool> {
    if opts.yes {
        return Ok(true);
    }

    let prefix = super::gen_prefix("");
    let msg = format!("{prefix}{msg}");
    let res = Confirm::new().with_prompt(msg).default(default).interact()?;
    Ok(res)
}
