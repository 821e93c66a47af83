use std::{
    fs::{
        self,
        File,
    },
    io::{
        self,
        BufReader,
        BufWriter,
    },
    path::{
        Path,
        PathBuf,
    },
};

use liblzma::read::XzDecoder;
use log::{
    debug,
    info,
};
use tar::Archive;
use vibrato::Dictionary;
use zstd::stream::copy_decode;

use super::DictType;
use crate::{
    core::{
        http::{
            download_to_file,
            http_client,
        },
        KotoError,
    },
    persistence::get_app_data_dir,
};

const SYSTEM_DIC: &str = "system.dic";

fn get_tokenizer_dict_dir() -> PathBuf {
    get_app_data_dir().join("dictionaries").join("tokenizer")
}

/// Returns the path of the decompressed `system.dic` for `dict_type`,
/// downloading and unpacking the release archive on first use.
pub fn ensure_dictionary(
    dict_type: &DictType,
    progress_callback: Option<Box<dyn Fn(String) + Send>>,
) -> Result<PathBuf, KotoError> {
    let folder_name = dict_type.folder_name();
    let dict_dir = get_tokenizer_dict_dir();
    let extract_path = dict_dir.join(folder_name);
    let final_dic_path = extract_path.join(SYSTEM_DIC);

    if final_dic_path.exists() {
        callback_message("Tokenizer dictionary already downloaded, loading...", &progress_callback);
        return Ok(final_dic_path);
    }

    fs::create_dir_all(&dict_dir)?;

    // Leftovers from an interrupted attempt
    let download_path = dict_dir.join(format!("{}.tar.xz", folder_name));
    let tar_path = dict_dir.join(format!("{}.tar", folder_name));
    fs::remove_file(&download_path).ok();
    fs::remove_file(&tar_path).ok();
    fs::remove_dir_all(&extract_path).ok();

    callback_message("Downloading tokenizer dictionary...", &progress_callback);
    let client = http_client()?;
    download_to_file(&client, dict_type.url(), &download_path)?;

    if download_path.metadata()?.len() == 0 {
        return Err(KotoError::Custom(format!(
            "Downloaded file {:?} is empty. Check your internet connection.",
            download_path
        )));
    }

    callback_message("Extracting tokenizer dictionary...", &progress_callback);
    unpack_tar_xz(&download_path, &tar_path, &extract_path)?;

    let zst_path = extract_path.join(folder_name).join("system.dic.zst");
    if !zst_path.exists() {
        return Err(KotoError::Custom(format!(
            "ZST file not found at {:?} after extraction.",
            zst_path
        )));
    }

    let zst_file = File::open(&zst_path)?;
    let dic_file = File::create(&final_dic_path)?;
    copy_decode(BufReader::new(zst_file), BufWriter::new(dic_file)).map_err(|e| {
        KotoError::Custom(format!("Failed to decompress ZST to {:?}: {}", final_dic_path, e))
    })?;

    fs::remove_dir_all(extract_path.join(folder_name))?;
    fs::remove_file(&download_path)?;
    fs::remove_file(&tar_path)?;
    callback_message("Tokenizer dictionary ready", &progress_callback);

    Ok(final_dic_path)
}

fn unpack_tar_xz(archive_path: &Path, tar_path: &Path, extract_path: &Path) -> Result<(), KotoError> {
    let mut tar_file = File::create(tar_path)?;
    let mut xz_decoder = XzDecoder::new(BufReader::new(File::open(archive_path)?));
    io::copy(&mut xz_decoder, &mut tar_file).map_err(|e| {
        KotoError::Custom(format!("Failed to decompress XZ to TAR: {}. Possible corrupt download.", e))
    })?;
    debug!("Decompressed {:?} to {:?}", archive_path, tar_path);

    let mut archive = Archive::new(BufReader::new(File::open(tar_path)?));
    archive.unpack(extract_path)?;
    Ok(())
}

pub fn load_dictionary(path: &Path) -> Result<Dictionary, KotoError> {
    let reader = BufReader::new(File::open(path)?);
    let dict = Dictionary::read(reader)?;
    Ok(dict)
}

fn callback_message(message: &str, callback: &Option<Box<dyn Fn(String) + Send>>) {
    info!("{}", message);
    if let Some(ref cb) = callback {
        cb(message.to_string());
    }
}
