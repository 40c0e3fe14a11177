fn main() {
    // Set linker flags for macOS to help dylib resolution
    #[cfg(target_os = "macos")]
    {
        println!("cargo:rustc-link-arg=-Wl,-rpath,@executable_path/../Frameworks");
    }

    // The library builds without Tauri; only the desktop host needs its codegen.
    #[cfg(feature = "desktop")]
    tauri_build::build()
}
