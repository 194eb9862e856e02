//! Filepath: src/helpers/shared.rs
//! Message text shared by more than one advisor. Kept behind
//! functions so the string assembly cost is only paid when a
//! message actually fires.

use crate::infra::utils::Md;

/// The standard teaching text about unpacking, used both when
/// unpacking is spotted and when an opportunity for it is.
pub fn unpacking_msg() -> String {
    Md::para(
        "Unpacking is much more pythonic than using indexes to pull a \
         sequence apart into names (variables). For example:",
    ) + &Md::h4("Un-pythonic :-(")
        + &Md::code_block(
            "location = (-37, 174, 'Auckland', 'Mt Albert')\n\
             lat = location[0]\n\
             lon = location[1]\n\
             city = location[2]\n\
             suburb = location[3]",
        )
        + &Md::h4("Pythonic :-)")
        + &Md::code_block("lat, lon, city, suburb = location")
        + &Md::para(
            "If you don't need all the values you can indicate which you want \
             to ignore, or even mop up multiple unused values into a single \
             name, using an asterisk:",
        )
        + &Md::code_block("lat, lon, *_ = location")
        + &Md::para(
            "In which case the underscore name collects everything after the \
             longitude, and its name signals that nobody intends to use it.",
        )
}

/// The standard teaching text about why comprehensions are worth
/// knowing, shared by the collection overview advisors.
pub fn comprehension_msg() -> String {
    Md::para(
        "Comprehensions are one of the great things about Python. In short, \
         if the goal of your code can be expressed as a single English \
         sentence then it might belong on one line. The code should say what \
         it is doing more than how it is doing it.",
    ) + &Md::para(
        "Pro tip: don't make comprehensions *in*comprehensible ;-). If your \
         comprehension is hard to read it is probably better rewritten as a \
         looping structure.",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_texts_are_nonempty_markdown() {
        assert!(unpacking_msg().contains("```python"));
        assert!(comprehension_msg().contains("Comprehensions"));
    }
}
