use bmp_hide::{
    cli::{DecodeArgs, EncodeArgs},
    handler::{handle_decode, handle_encode},
};
use image::{ImageBuffer, Rgb};
use rand::RngCore;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// 一个辅助函数，用于创建一个带有随机像素的 24 位 BMP 测试图像
fn create_test_image(path: &Path, width: u32, height: u32) {
    let mut raw_pixels = vec![0u8; (width * height * 3) as usize];
    rand::rng().fill_bytes(&mut raw_pixels);

    let img_buf: ImageBuffer<Rgb<u8>, Vec<u8>> =
        ImageBuffer::from_raw(width, height, raw_pixels).expect("pixel buffer size must match");

    img_buf.save(path).expect("Failed to create test image.");
}

/// 验证从隐藏到提取的完整流程
#[test]
fn test_handle_encode_and_decode_integration() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let carrier_path = dir.path().join("carrier.bmp");
    let stego_path = dir.path().join("stego.bmp");
    let secret_path = dir.path().join("secret.txt");
    let output_base = dir.path().join("recovered");

    create_test_image(&carrier_path, 100, 100);
    let original = b"hello world";
    fs::write(&secret_path, original)?;

    // 2. 测试 handle_encode
    let encode_args = EncodeArgs {
        image: carrier_path.clone(),
        secret: secret_path.clone(),
        dest: Some(stego_path.clone()),
        force: false,
    };
    handle_encode(encode_args)?;
    assert!(stego_path.exists(), "Stego image should be created.");

    // 3. 测试 handle_decode
    let decode_args = DecodeArgs {
        image: stego_path.clone(),
        output: Some(output_base.clone()),
        force: false,
    };
    let final_path = handle_decode(decode_args)?;

    // 4. 验证结果：扩展名被追加，内容逐字节一致
    assert_eq!(
        final_path,
        dir.path().join("recovered.txt"),
        "The recovered extension must be appended to the output base name."
    );
    let recovered = fs::read(&final_path)?;
    assert_eq!(
        original.as_slice(),
        recovered.as_slice(),
        "Recovered data must match the original."
    );

    Ok(())
}

/// 验证当用户不提供输出路径时，是否能正确生成默认路径并完成操作
#[test]
fn test_handle_encode_and_decode_with_defaults() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let carrier_path = dir.path().join("original.bmp");
    let secret_path = dir.path().join("source.txt");

    create_test_image(&carrier_path, 100, 100);
    fs::write(&secret_path, "Testing default path generation.")?;

    // 2. 测试 handle_encode，不提供 dest 路径
    let encode_args = EncodeArgs {
        image: carrier_path.clone(),
        secret: secret_path.clone(),
        dest: None, // 关键：测试 None 的情况
        force: false,
    };
    handle_encode(encode_args)?;

    // 验证默认的隐写图像文件是否已创建
    let expected_stego_path = dir.path().join("encoded_original.bmp");
    assert!(
        expected_stego_path.exists(),
        "Default stego image should be created at: {:?}",
        expected_stego_path
    );

    // 3. 测试 handle_decode，不提供 output 基础名
    let decode_args = DecodeArgs {
        image: expected_stego_path, // 使用上一步生成的默认文件
        output: None,               // 关键：测试 None 的情况
        force: false,
    };
    let final_path = handle_decode(decode_args)?;

    // 4. 验证结果：默认基础名 + 解出的扩展名
    assert_eq!(
        final_path,
        dir.path().join("decoded_encoded_original.txt"),
        "Default output name should be derived from the stego image name."
    );
    let recovered = fs::read_to_string(&final_path)?;
    assert_eq!("Testing default path generation.", recovered);

    Ok(())
}

/// 验证覆盖保护机制以及 `--force` 标志是否按预期工作
#[test]
fn test_overwrite_protection_and_force_flag() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let carrier_path = dir.path().join("image.bmp");
    let secret_path = dir.path().join("text.txt");
    let dest_path = dir.path().join("dest.bmp");

    create_test_image(&carrier_path, 50, 50);
    fs::write(&secret_path, "some text")?;

    // 2. 场景一：测试覆盖保护
    // 先创建一个同名的目标文件，模拟“文件已存在”的场景
    fs::write(&dest_path, "this is a dummy file to be overwritten")?;
    assert!(dest_path.exists());

    // 构建参数，不使用 --force
    let encode_args_no_force = EncodeArgs {
        image: carrier_path.clone(),
        secret: secret_path.clone(),
        dest: Some(dest_path.clone()),
        force: false,
    };

    // 执行并断言操作会失败
    let result = handle_encode(encode_args_no_force);
    assert!(
        result.is_err(),
        "Execution should fail without --force when file exists."
    );
    if let Err(e) = result {
        assert!(e.to_string().contains("Output file already exists"));
    }

    // 3. 场景二：测试强制覆盖
    // 构建参数，这次使用 --force
    let encode_args_with_force = EncodeArgs {
        image: carrier_path.clone(),
        secret: secret_path.clone(),
        dest: Some(dest_path.clone()),
        force: true,
    };

    // 执行并断言操作会成功
    let result = handle_encode(encode_args_with_force);
    assert!(
        result.is_ok(),
        "Execution should succeed with --force when file exists."
    );

    // 验证文件确实被覆盖（内容不再是 "this is a dummy file..."）
    let dummy_content = fs::read(&dest_path)?;
    assert_ne!(dummy_content, b"this is a dummy file to be overwritten");

    Ok(())
}

/// 验证解码侧的覆盖保护作用于追加扩展名之后的最终路径
#[test]
fn test_decode_overwrite_protection_on_final_path() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let carrier_path = dir.path().join("carrier.bmp");
    let stego_path = dir.path().join("stego.bmp");
    let secret_path = dir.path().join("secret.txt");

    create_test_image(&carrier_path, 100, 100);
    fs::write(&secret_path, "new contents")?;

    handle_encode(EncodeArgs {
        image: carrier_path,
        secret: secret_path,
        dest: Some(stego_path.clone()),
        force: false,
    })?;

    // 2. 场景一：用户提供的基础名是 "out"，但最终路径是追加了
    // 扩展名之后的 "out.txt"——已存在的 out.txt 必须受到保护
    let existing_path = dir.path().join("out.txt");
    fs::write(&existing_path, "precious data")?;

    let result = handle_decode(DecodeArgs {
        image: stego_path.clone(),
        output: Some(dir.path().join("out")),
        force: false,
    });

    assert!(
        result.is_err(),
        "Decoding should fail without --force when the final output file exists."
    );
    assert_eq!(
        fs::read_to_string(&existing_path)?,
        "precious data",
        "The existing file must be left untouched."
    );

    // 3. 场景二：使用 --force 时允许覆盖
    let final_path = handle_decode(DecodeArgs {
        image: stego_path,
        output: Some(dir.path().join("out")),
        force: true,
    })?;

    assert_eq!(final_path, existing_path);
    assert_eq!(fs::read_to_string(&existing_path)?, "new contents");

    Ok(())
}

/// 验证空间不足时的错误处理
#[test]
fn test_handle_encode_not_enough_space() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let carrier_path = dir.path().join("small.bmp");
    let secret_path = dir.path().join("large.txt");
    let dest_path = dir.path().join("dest.bmp");

    // 创建一个非常小的图片
    create_test_image(&carrier_path, 10, 10);
    // 创建一个非常大的文本
    let large_text = "a".repeat(5000);
    fs::write(&secret_path, large_text)?;

    // 2. 执行并断言错误
    let encode_args = EncodeArgs {
        image: carrier_path,
        secret: secret_path,
        dest: Some(dest_path.clone()),
        force: false,
    };
    let result = handle_encode(encode_args);

    assert!(result.is_err());
    if let Err(e) = result {
        assert!(format!("{e:#}").contains("insufficient capacity"));
    }

    Ok(())
}

/// 验证编码后 BMP 头部被原样保留、文件总长度不变
#[test]
fn test_header_preserved_and_sizes_equal() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let carrier_path = dir.path().join("carrier.bmp");
    let stego_path = dir.path().join("stego.bmp");
    let secret_path = dir.path().join("secret.txt");

    create_test_image(&carrier_path, 64, 64);
    fs::write(&secret_path, "payload bytes")?;

    // 2. 执行编码
    handle_encode(EncodeArgs {
        image: carrier_path.clone(),
        secret: secret_path,
        dest: Some(stego_path.clone()),
        force: false,
    })?;

    // 3. 验证头部与总长度
    let original = fs::read(&carrier_path)?;
    let stego = fs::read(&stego_path)?;
    assert_eq!(
        original.len(),
        stego.len(),
        "Encoding must not change the file length."
    );
    assert_eq!(
        &original[..54],
        &stego[..54],
        "The first 54 header bytes must be bit-identical."
    );

    Ok(())
}

/// 验证解码未经过隐写的图像时会因魔术标记不匹配而失败
#[test]
fn test_decode_rejects_plain_image() -> anyhow::Result<()> {
    // 1. 准备环境：全零像素保证标记位置解不出魔术标记
    let dir = tempdir()?;
    let plain_path = dir.path().join("plain.bmp");

    let img_buf: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(32, 32, Rgb([0, 0, 0]));
    img_buf.save(&plain_path)?;

    // 2. 执行并断言错误
    let result = handle_decode(DecodeArgs {
        image: plain_path,
        output: Some(dir.path().join("out")),
        force: false,
    });

    assert!(result.is_err());
    if let Err(e) = result {
        assert!(format!("{e:#}").contains("magic marker mismatch"));
    }

    Ok(())
}

/// 验证输出名已带扩展名时不会重复追加 (不会出现 .txt.txt)
#[test]
fn test_extension_not_duplicated() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let carrier_path = dir.path().join("carrier.bmp");
    let stego_path = dir.path().join("stego.bmp");
    let secret_path = dir.path().join("secret.txt");

    create_test_image(&carrier_path, 100, 100);
    fs::write(&secret_path, "no double suffix")?;

    handle_encode(EncodeArgs {
        image: carrier_path,
        secret: secret_path,
        dest: Some(stego_path.clone()),
        force: false,
    })?;

    // 2. 解码到一个已经以 .txt 结尾的输出名
    let final_path = handle_decode(DecodeArgs {
        image: stego_path,
        output: Some(dir.path().join("out.txt")),
        force: false,
    })?;

    // 3. 验证没有重复追加
    assert_eq!(final_path, dir.path().join("out.txt"));
    assert_eq!(fs::read_to_string(&final_path)?, "no double suffix");

    Ok(())
}

/// 验证零长度秘密文件作为合法的退化情况也能完成往返
#[test]
fn test_zero_length_secret_round_trip() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let carrier_path = dir.path().join("carrier.bmp");
    let stego_path = dir.path().join("stego.bmp");
    let secret_path = dir.path().join("empty.txt");

    create_test_image(&carrier_path, 50, 50);
    fs::write(&secret_path, "")?;

    // 2. 执行往返
    handle_encode(EncodeArgs {
        image: carrier_path,
        secret: secret_path,
        dest: Some(stego_path.clone()),
        force: false,
    })?;
    let final_path = handle_decode(DecodeArgs {
        image: stego_path,
        output: Some(dir.path().join("empty_out")),
        force: false,
    })?;

    // 3. 验证结果
    assert_eq!(final_path, dir.path().join("empty_out.txt"));
    assert_eq!(fs::metadata(&final_path)?.len(), 0);

    Ok(())
}

/// 验证错误的文件后缀在进入核心管线之前就被拒绝
#[test]
fn test_suffix_validation() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let carrier_path = dir.path().join("carrier.png");
    let secret_path = dir.path().join("secret.txt");
    fs::write(&carrier_path, "not a bmp")?;
    fs::write(&secret_path, "text")?;

    let result = handle_encode(EncodeArgs {
        image: carrier_path,
        secret: secret_path,
        dest: None,
        force: false,
    });

    assert!(result.is_err());
    if let Err(e) = result {
        assert!(e.to_string().contains("Invalid file name"));
    }

    Ok(())
}
