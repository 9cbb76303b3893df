/// Packages the plugin through nih_plug_xtask's `bundle` subcommand:
///
///   cargo xtask bundle wstd-dl3y --release
///
/// The bundles land in `target/bundled/` as `WSTD DL3Y.vst3` and
/// `WSTD DL3Y.clap`.
fn main() -> nih_plug_xtask::Result<()> {
    nih_plug_xtask::main()
}
