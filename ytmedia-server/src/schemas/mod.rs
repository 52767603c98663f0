pub mod yt_download;
