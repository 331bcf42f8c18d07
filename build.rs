fn main() -> anyhow::Result<()> {
    // The ESP-IDF environment is only needed when building the firmware image.
    #[cfg(feature = "firmware")]
    embuild::espidf::sysenv::output();

    Ok(())
}
