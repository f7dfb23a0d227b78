#![warn(clippy::pedantic, elided_lifetimes_in_paths, explicit_outlives_requirements)]
#![allow(non_snake_case)]

pub const RGB_SIZE: usize = 3;
pub const RGBX_SIZE: usize = 4;

/// Paletted bitmaps as they come out of the frame dumps.
pub mod bitmap {
	use {
		super::RGB_SIZE,
		png::{ColorType, Transformations},
		std::io::Read,
	};

	#[derive(Debug, thiserror::Error)]
	pub enum Error {
		#[error("PNG decoding failed: {0}")]
		Decoding(#[from] png::DecodingError),
		#[error("expected an indexed-color PNG, got {0:?}")]
		NotIndexed(ColorType),
		#[error("indexed PNG carries no PLTE chunk")]
		MissingPalette,
		#[error("image has no pixels")]
		EmptyImage,
	}

	#[derive(Clone, Copy, Debug, PartialEq, Eq)]
	pub enum ColorDepth {
		TwoBpp,
		FourBpp,
	}

	impl ColorDepth {
		pub fn fromPaletteLen(paletteLen: usize) -> Self {
			if paletteLen <= Self::TwoBpp.numColors() {
				Self::TwoBpp
			} else {
				Self::FourBpp
			}
		}

		pub const fn bitsPerPixel(self) -> usize {
			match self {
				Self::TwoBpp => 2,
				Self::FourBpp => 4,
			}
		}

		pub const fn numColors(self) -> usize {
			1 << self.bitsPerPixel()
		}
	}

	/// One palette index per byte, row-major.
	#[derive(Clone, Debug, PartialEq, Eq)]
	pub struct IndexedImage {
		pub width: usize,
		pub height: usize,
		pub palette: Vec<[u8; RGB_SIZE]>,
		pub data: Vec<u8>,
	}

	impl IndexedImage {
		pub fn new(width: usize, height: usize, palette: Vec<[u8; RGB_SIZE]>, data: Vec<u8>) -> Self {
			assert_eq!(data.len(), width * height);
			Self { width, height, palette, data }
		}

		pub fn fromPNG(reader: impl Read) -> Result<Self, Error> {
			let mut decoder = png::Decoder::new(reader);
			decoder.set_transformations(Transformations::IDENTITY);
			let png = &mut decoder.read_info()?;
			let &png::Info { width, height, color_type, bit_depth, .. } = png.info();
			if color_type != ColorType::Indexed {
				return Err(Error::NotIndexed(color_type));
			}
			if width == 0 || height == 0 {
				return Err(Error::EmptyImage);
			}
			let palette = png
				.info()
				.palette
				.as_ref()
				.ok_or(Error::MissingPalette)?
				.chunks_exact(RGB_SIZE)
				.map(|rgb| [rgb[0], rgb[1], rgb[2]])
				.collect::<Vec<_>>();
			let mut buffer = vec![0; png.output_buffer_size()];
			let frame = png.next_frame(&mut buffer)?;
			let width = width as usize;
			let data = unpackRows(&buffer[..frame.buffer_size()], frame.line_size, width, bit_depth as usize);
			Ok(Self::new(width, height as _, palette, data))
		}

		pub fn colorDepth(&self) -> ColorDepth {
			ColorDepth::fromPaletteLen(self.palette.len())
		}

		pub fn maxIndex(&self) -> u8 {
			self.data.iter().copied().max().unwrap_or(0)
		}
	}

	// PNG packs sub-byte pixels leftmost-first into the high bits.
	fn unpackRows(packed: &[u8], lineSize: usize, width: usize, bitsPerPixel: usize) -> Vec<u8> {
		let (pixelsPerByte, mask) = (8 / bitsPerPixel, u8::MAX >> (8 - bitsPerPixel));
		let mut data = Vec::with_capacity(width * (packed.len() / lineSize));
		for row in packed.chunks_exact(lineSize) {
			data.extend((0..width).map(|x| {
				let shift = 8 - bitsPerPixel * (x % pixelsPerByte + 1);
				(row[x / pixelsPerByte] >> shift) & mask
			}));
		}
		data
	}

	#[cfg(test)]
	mod tests {
		use super::*;

		#[test]
		fn classifiesByPaletteSize() {
			assert_eq!(ColorDepth::fromPaletteLen(1), ColorDepth::TwoBpp);
			assert_eq!(ColorDepth::fromPaletteLen(4), ColorDepth::TwoBpp);
			assert_eq!(ColorDepth::fromPaletteLen(5), ColorDepth::FourBpp);
			assert_eq!(ColorDepth::fromPaletteLen(256), ColorDepth::FourBpp);
		}

		#[test]
		fn classificationIgnoresUsedIndices() {
			let image = IndexedImage::new(2, 1, vec![[0; 3]; 16], vec![0, 1]);
			assert_eq!(image.colorDepth(), ColorDepth::FourBpp);
			assert_eq!(image.maxIndex(), 1);
		}

		#[test]
		fn unpacksTwoBitRows() {
			// 5 pixels per row need 2 bytes per row
			let packed = [0b00_01_10_11, 0b01_000000, 0b11_11_00_00, 0b10_000000];
			assert_eq!(unpackRows(&packed, 2, 5, 2), [0, 1, 2, 3, 1, 3, 3, 0, 0, 2]);
		}

		#[test]
		fn unpacksOneBitRows() {
			assert_eq!(unpackRows(&[0b1010_0000], 1, 3, 1), [1, 0, 1]);
			// 10 pixels per row need 2 bytes per row
			assert_eq!(
				unpackRows(&[0b1100_0011, 0b01_000000, 0b0000_0000, 0b10_000000], 2, 10, 1),
				[1, 1, 0, 0, 0, 0, 1, 1, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0]
			);
		}

		#[test]
		fn unpacksFourAndEightBitRows() {
			assert_eq!(unpackRows(&[0x1F, 0xA0], 1, 2, 4), [0x1, 0xF, 0xA, 0x0]);
			assert_eq!(unpackRows(&[7, 8, 9, 10], 2, 2, 8), [7, 8, 9, 10]);
		}

		#[test]
		fn rejectsTruecolorPNG() {
			let mut bytes = Vec::new();
			{
				let mut encoder = png::Encoder::new(&mut bytes, 1, 1);
				encoder.set_color(ColorType::Rgb);
				encoder.write_header().unwrap().write_image_data(&[1, 2, 3]).unwrap();
			}
			assert!(matches!(IndexedImage::fromPNG(bytes.as_slice()), Err(Error::NotIndexed(ColorType::Rgb))));
		}

		#[test]
		fn decodesOneBitPNGWithPaddedRows() {
			let mut bytes = Vec::new();
			{
				let mut encoder = png::Encoder::new(&mut bytes, 10, 2);
				encoder.set_color(ColorType::Indexed);
				encoder.set_depth(png::BitDepth::One);
				encoder.set_palette(vec![0, 0, 0, 255, 255, 255]);
				encoder
					.write_header()
					.unwrap()
					.write_image_data(&[0b1000_0001, 0b11_000000, 0b0111_1110, 0b00_000000])
					.unwrap();
			}
			let image = IndexedImage::fromPNG(bytes.as_slice()).unwrap();
			assert_eq!((image.width, image.height), (10, 2));
			assert_eq!(image.data, [1, 0, 0, 0, 0, 0, 0, 1, 1, 1, 0, 1, 1, 1, 1, 1, 1, 0, 0, 0]);
			assert_eq!(image.colorDepth(), ColorDepth::TwoBpp);
		}

		#[test]
		fn decodesIndexedPNG() {
			let mut bytes = Vec::new();
			{
				let mut encoder = png::Encoder::new(&mut bytes, 3, 2);
				encoder.set_color(ColorType::Indexed);
				encoder.set_depth(png::BitDepth::Four);
				encoder.set_palette(vec![0, 0, 0, 255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255]);
				encoder.write_header().unwrap().write_image_data(&[0x01, 0x20, 0x34, 0x10]).unwrap();
			}
			let image = IndexedImage::fromPNG(bytes.as_slice()).unwrap();
			assert_eq!((image.width, image.height), (3, 2));
			assert_eq!(image.data, [0, 1, 2, 3, 4, 1]);
			assert_eq!(image.palette.len(), 5);
			assert_eq!(image.palette[4], [255, 255, 255]);
			assert_eq!(image.colorDepth(), ColorDepth::FourBpp);
		}
	}
}

/// The SIR0 relocation envelope.
pub mod sir0 {
	use byteorder::{ByteOrder, LE};

	pub const MAGIC: &[u8; 4] = b"SIR0";
	pub const HEADER_LEN: usize = 0x10;
	pub const ALIGNMENT: usize = 16;
	const CONTENT_HEADER_POINTER_FIELD: usize = 0x04;
	const POINTER_LIST_POINTER_FIELD: usize = 0x08;
	const PADDING_BYTE: u8 = 0xAA;

	#[derive(Debug, PartialEq, Eq, thiserror::Error)]
	pub enum Error {
		#[error("pointer offsets must be strictly ascending ({previous:#X} then {next:#X})")]
		UnsortedPointers { previous: u32, next: u32 },
		#[error("pointer offset {0:#X} is not 4-byte aligned")]
		MisalignedPointer(u32),
		#[error("offset {0:#X} lies outside the content")]
		OutOfBounds(u32),
	}

	pub fn padTo(buffer: &mut Vec<u8>, alignment: usize, byte: u8) {
		let padded = (buffer.len() + alignment - 1) / alignment * alignment;
		buffer.resize(padded, byte);
	}

	/// Offsets are relative to `content`; every pointer they name is rebased past the envelope header.
	pub fn wrap(content: &[u8], contentHeaderOffset: u32, pointerOffsets: &[u32]) -> Result<Vec<u8>, Error> {
		if contentHeaderOffset as usize >= content.len() {
			return Err(Error::OutOfBounds(contentHeaderOffset));
		}
		let mut previous: Option<u32> = None;
		for &offset in pointerOffsets {
			if offset % 4 != 0 {
				return Err(Error::MisalignedPointer(offset));
			}
			if offset as usize + 4 > content.len() {
				return Err(Error::OutOfBounds(offset));
			}
			if let Some(previous) = previous.filter(|&previous| previous >= offset) {
				return Err(Error::UnsortedPointers { previous, next: offset });
			}
			previous = Some(offset);
		}

		let mut sir0 = Vec::with_capacity(HEADER_LEN + content.len() + 2 * ALIGNMENT);
		sir0.extend_from_slice(MAGIC);
		sir0.resize(HEADER_LEN, 0);
		sir0.extend_from_slice(content);
		padTo(&mut sir0, ALIGNMENT, 0);

		let mut absoluteOffsets = Vec::with_capacity(pointerOffsets.len() + 2);
		absoluteOffsets.extend([CONTENT_HEADER_POINTER_FIELD as u32, POINTER_LIST_POINTER_FIELD as u32]);
		for &offset in pointerOffsets {
			let field = &mut sir0[HEADER_LEN + offset as usize..][..4];
			let rebased = LE::read_u32(field) + HEADER_LEN as u32;
			LE::write_u32(field, rebased);
			absoluteOffsets.push(HEADER_LEN as u32 + offset);
		}

		let pointerListOffset = sir0.len() as u32;
		LE::write_u32(&mut sir0[CONTENT_HEADER_POINTER_FIELD..], HEADER_LEN as u32 + contentHeaderOffset);
		LE::write_u32(&mut sir0[POINTER_LIST_POINTER_FIELD..], pointerListOffset);
		sir0.extend(encodePointerOffsets(&absoluteOffsets));
		padTo(&mut sir0, ALIGNMENT, PADDING_BYTE);
		Ok(sir0)
	}

	/// Deltas between consecutive offsets, big-endian base-128, zero-terminated.
	pub fn encodePointerOffsets(offsets: &[u32]) -> Vec<u8> {
		let (mut encoded, mut previous) = (Vec::with_capacity(offsets.len() * 2 + 1), 0);
		for &offset in offsets {
			let (mut delta, mut groups, mut n) = (offset - previous, [0_u8; 5], 0);
			previous = offset;
			loop {
				groups[n] = (delta & 0x7F) as u8;
				n += 1;
				delta >>= 7;
				if delta == 0 {
					break;
				}
			}
			for (i, &group) in groups[..n].iter().rev().enumerate() {
				encoded.push(if i + 1 < n { group | 0x80 } else { group });
			}
		}
		encoded.push(0);
		encoded
	}

	#[cfg(test)]
	mod tests {
		use super::*;

		#[test]
		fn encodesSmallDeltasAsSingleBytes() {
			assert_eq!(encodePointerOffsets(&[4, 8]), [4, 4, 0]);
		}

		#[test]
		fn encodesLargeDeltasWithContinuationBits() {
			// 0x218 - 8 = 528 = 4 * 128 + 16
			assert_eq!(encodePointerOffsets(&[4, 8, 0x218]), [4, 4, 0x84, 0x10, 0]);
			assert_eq!(encodePointerOffsets(&[0x4000]), [0x81, 0x80, 0x00, 0]);
		}

		#[test]
		fn wrapsAndRebasesPointers() {
			let mut content = vec![0_u8; 0x20];
			LE::write_u32(&mut content[0x14..], 0x08);
			let sir0 = wrap(&content, 0x10, &[0x14]).unwrap();

			assert_eq!(&sir0[..4], MAGIC);
			assert_eq!(LE::read_u32(&sir0[0x04..]), 0x20);
			assert_eq!(LE::read_u32(&sir0[0x08..]), 0x30);
			assert_eq!(LE::read_u32(&sir0[0x0C..]), 0);
			assert_eq!(LE::read_u32(&sir0[0x24..]), 0x18);
			assert_eq!(&sir0[0x30..0x34], [4, 4, 0x1C, 0]);
			assert!(sir0[0x34..].iter().all(|&byte| byte == PADDING_BYTE));
			assert_eq!(sir0.len(), 0x40);
		}

		#[test]
		fn rejectsBadPointerLists() {
			let content = [0_u8; 0x20];
			assert_eq!(wrap(&content, 0, &[8, 4]), Err(Error::UnsortedPointers { previous: 8, next: 4 }));
			assert_eq!(wrap(&content, 0, &[8, 8]), Err(Error::UnsortedPointers { previous: 8, next: 8 }));
			assert_eq!(wrap(&content, 0, &[6]), Err(Error::MisalignedPointer(6)));
			assert_eq!(wrap(&content, 0, &[0x1C, 0x20]), Err(Error::OutOfBounds(0x20)));
			assert_eq!(wrap(&content, 0x20, &[]), Err(Error::OutOfBounds(0x20)));
		}
	}
}

/// WTE texture container.
pub mod wte {
	use {
		super::{
			bitmap::{ColorDepth, IndexedImage},
			sir0, RGBX_SIZE,
		},
		byteorder::{WriteBytesExt, LE},
		serde::Serialize,
		std::io::{self, Write},
	};

	pub const MAGIC: &[u8; 4] = b"WTE\0";
	pub const HEADER_LEN: usize = 0x20;
	pub const TILE_SIZE: usize = 8;
	pub const MAX_DIMENSION: usize = TILE_SIZE << 7;
	const IMAGE_POINTER_FIELD: u32 = 0x04;
	const PALETTE_POINTER_FIELD: u32 = 0x18;
	const PALETTE_ALPHA: u8 = 0x80;

	#[derive(Debug, thiserror::Error)]
	pub enum Error {
		#[error("padded texture {width}x{height} exceeds {max}x{max}", max = MAX_DIMENSION)]
		TooLarge { width: usize, height: usize },
		#[error("pixel uses palette index {index}, but the texture holds {numColors} colors")]
		IndexOutOfRange { index: u8, numColors: usize },
		#[error(transparent)]
		Sir0(#[from] sir0::Error),
		#[error(transparent)]
		Io(#[from] io::Error),
	}

	/// Hardware texture format ids.
	#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
	pub enum ImageType {
		#[serde(rename = "2bpp")]
		Color2bpp = 0x02,
		#[serde(rename = "4bpp")]
		Color4bpp = 0x03,
	}

	impl From<ColorDepth> for ImageType {
		fn from(colorDepth: ColorDepth) -> Self {
			match colorDepth {
				ColorDepth::TwoBpp => Self::Color2bpp,
				ColorDepth::FourBpp => Self::Color4bpp,
			}
		}
	}

	impl ImageType {
		pub const fn colorDepth(self) -> ColorDepth {
			match self {
				Self::Color2bpp => ColorDepth::TwoBpp,
				Self::Color4bpp => ColorDepth::FourBpp,
			}
		}
	}

	#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
	pub struct Metadata {
		pub imageType: ImageType,
		pub width: u16,
		pub height: u16,
		pub dimensionCode: u8,
		pub numColors: usize,
	}

	#[derive(Clone, Debug, PartialEq, Eq)]
	pub struct Wte {
		pub imageType: ImageType,
		pub width: u16,
		pub height: u16,
		pub dimensionCode: u8,
		pub pixels: Vec<u8>,
		pub palette: Vec<[u8; RGBX_SIZE]>,
	}

	impl Wte {
		pub fn new(image: &IndexedImage) -> Result<Self, Error> {
			let colorDepth = image.colorDepth();
			let numColors = colorDepth.numColors();
			if let Some(index) = image.data.iter().copied().find(|&index| index as usize >= numColors) {
				return Err(Error::IndexOutOfRange { index, numColors });
			}
			let [width, height] = [image.width, image.height].map(alignToTile);
			if width > MAX_DIMENSION || height > MAX_DIMENSION {
				return Err(Error::TooLarge { width, height });
			}

			// leftmost pixel in the lowest bits
			let (bitsPerPixel, pixelsPerByte) = (colorDepth.bitsPerPixel(), 8 / colorDepth.bitsPerPixel());
			let mut pixels = vec![0_u8; width * height / pixelsPerByte];
			for (y, row) in image.data.chunks_exact(image.width.max(1)).enumerate() {
				for (x, &index) in row.iter().enumerate() {
					let i = y * width + x;
					pixels[i / pixelsPerByte] |= index << (bitsPerPixel * (i % pixelsPerByte));
				}
			}

			let mut palette = image
				.palette
				.iter()
				.take(numColors)
				.map(|&[red, green, blue]| [red, green, blue, PALETTE_ALPHA])
				.collect::<Vec<_>>();
			palette.resize(numColors, [0, 0, 0, PALETTE_ALPHA]);

			Ok(Self {
				imageType: colorDepth.into(),
				width: width as _,
				height: height as _,
				dimensionCode: textureSizeShift(width) | textureSizeShift(height) << 3,
				pixels,
				palette,
			})
		}

		pub fn serialize(&self) -> Result<Vec<u8>, Error> {
			let mut content = Vec::with_capacity(self.pixels.len() + self.palette.len() * RGBX_SIZE + HEADER_LEN);
			let imagePointer = content.len() as u32;
			content.extend_from_slice(&self.pixels);
			sir0::padTo(&mut content, sir0::ALIGNMENT, 0);
			let palettePointer = content.len() as u32;
			for entry in &self.palette {
				content.extend_from_slice(entry);
			}
			sir0::padTo(&mut content, sir0::ALIGNMENT, 0);

			let headerOffset = content.len() as u32;
			content.extend_from_slice(MAGIC);
			content.write_u32::<LE>(imagePointer)?;
			content.write_u32::<LE>(self.pixels.len() as _)?;
			content.write_u8(self.dimensionCode)?;
			content.write_u8(self.imageType as _)?;
			content.write_u16::<LE>(0)?;
			content.write_u32::<LE>(0)?;
			content.write_u16::<LE>(self.width)?;
			content.write_u16::<LE>(self.height)?;
			content.write_u32::<LE>(palettePointer)?;
			content.write_u32::<LE>(self.palette.len() as _)?;
			assert_eq!(content.len() - headerOffset as usize, HEADER_LEN);

			Ok(sir0::wrap(
				&content,
				headerOffset,
				&[headerOffset + IMAGE_POINTER_FIELD, headerOffset + PALETTE_POINTER_FIELD],
			)?)
		}

		/// Returns the number of bytes written.
		pub fn writeTo(&self, writer: &mut impl Write) -> Result<usize, Error> {
			let bytes = self.serialize()?;
			writer.write_all(&bytes)?;
			Ok(bytes.len())
		}

		pub fn metadata(&self) -> Metadata {
			Metadata {
				imageType: self.imageType,
				width: self.width,
				height: self.height,
				dimensionCode: self.dimensionCode,
				numColors: self.palette.len(),
			}
		}
	}

	fn alignToTile(dimension: usize) -> usize {
		(dimension + TILE_SIZE - 1) / TILE_SIZE * TILE_SIZE
	}

	// smallest `shift` with `TILE_SIZE << shift >= dimension`
	fn textureSizeShift(dimension: usize) -> u8 {
		(dimension.next_power_of_two() / TILE_SIZE).trailing_zeros() as _
	}

}

/// Batch conversion of numbered frame dumps.
pub mod frames {
	use {
		super::{
			bitmap::{self, IndexedImage},
			toml_toStringPretty,
			wte::{self, ImageType, Wte},
		},
		core::{iter::StepBy, ops::Range, str::FromStr},
		log::{debug, info, warn},
		serde::Serialize,
		std::{
			fs::{self, File},
			io::{self, BufReader},
			path::{Path, PathBuf},
		},
	};

	pub const WTE_EXTENSION: &str = "wte";
	const INDEX_PLACEHOLDER: char = '#';

	#[derive(Debug, thiserror::Error)]
	pub enum Error {
		#[error("frame template {0:?} needs exactly one run of '#'")]
		BadTemplate(String),
		#[error("{0:?}: no such frame")]
		MissingFrame(PathBuf),
		#[error("{path:?}: {source}")]
		Open { path: PathBuf, source: io::Error },
		#[error("{path:?}: {source}")]
		Create { path: PathBuf, source: io::Error },
		#[error("{path:?}: {source}")]
		Bitmap { path: PathBuf, source: bitmap::Error },
		#[error("{path:?}: {source}")]
		Wte { path: PathBuf, source: wte::Error },
		#[error("manifest serialization failed: {0}")]
		Manifest(#[from] toml::ser::Error),
	}

	#[derive(Clone, Copy, Debug, PartialEq, Eq)]
	pub struct FrameRange {
		pub start: usize,
		pub end: usize,
		pub step: usize,
	}

	impl Default for FrameRange {
		fn default() -> Self {
			Self { start: 0, end: 2000, step: 10 }
		}
	}

	impl FrameRange {
		pub fn indices(&self) -> StepBy<Range<usize>> {
			(self.start..self.end).step_by(self.step)
		}
	}

	/// A file name template whose single `#` run becomes the zero-padded frame index.
	#[derive(Clone, Debug, PartialEq, Eq)]
	pub struct FrameNaming {
		prefix: String,
		digits: usize,
		suffix: String,
	}

	impl FromStr for FrameNaming {
		type Err = Error;
		fn from_str(template: &str) -> Result<Self, Self::Err> {
			let badTemplate = || Error::BadTemplate(template.to_owned());
			let start = template.find(INDEX_PLACEHOLDER).ok_or_else(badTemplate)?;
			let digits = template[start..].chars().take_while(|&c| c == INDEX_PLACEHOLDER).count();
			let suffix = &template[start + digits..];
			if suffix.contains(INDEX_PLACEHOLDER) {
				return Err(badTemplate());
			}
			Ok(Self { prefix: template[..start].to_owned(), digits, suffix: suffix.to_owned() })
		}
	}

	impl FrameNaming {
		pub fn fileName(&self, index: usize) -> String {
			format!("{}{index:0digits$}{}", self.prefix, self.suffix, digits = self.digits)
		}

		pub fn withExtension(&self, extension: &str) -> Self {
			let stem = self.suffix.rfind('.').map_or(self.suffix.as_str(), |dot| &self.suffix[..dot]);
			Self { suffix: format!("{stem}.{extension}"), ..self.clone() }
		}
	}

	#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
	pub struct ManifestEntry {
		pub index: usize,
		pub source: PathBuf,
		pub output: PathBuf,
		pub imageType: ImageType,
		pub width: u16,
		pub height: u16,
		pub numColors: usize,
		pub size: usize,
	}

	#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
	pub struct Manifest {
		pub frame: Vec<ManifestEntry>,
	}

	impl Manifest {
		pub fn toToml(&self) -> Result<String, Error> {
			Ok(toml_toStringPretty(self)?)
		}
	}

	pub fn convertFrames(
		srcDir: &Path,
		destDir: &Path,
		naming: &FrameNaming,
		range: &FrameRange,
		skipMissing: bool,
	) -> Result<Manifest, Error> {
		fs::create_dir_all(destDir).map_err(|source| Error::Create { path: destDir.to_owned(), source })?;
		let (outputNaming, mut manifest) = (naming.withExtension(WTE_EXTENSION), Manifest::default());
		for index in range.indices() {
			let framePath = srcDir.join(naming.fileName(index));
			let file = match File::open(&framePath) {
				Ok(file) => file,
				Err(err) if err.kind() == io::ErrorKind::NotFound => {
					if skipMissing {
						warn!("{framePath:?}: missing, skipped");
						continue;
					}
					return Err(Error::MissingFrame(framePath));
				}
				Err(source) => return Err(Error::Open { path: framePath, source }),
			};
			let image = IndexedImage::fromPNG(BufReader::new(file))
				.map_err(|source| Error::Bitmap { path: framePath.clone(), source })?;
			let wte = Wte::new(&image).map_err(|source| Error::Wte { path: framePath.clone(), source })?;
			let outputPath = destDir.join(outputNaming.fileName(index));
			let size = {
				let bytes = wte.serialize().map_err(|source| Error::Wte { path: framePath.clone(), source })?;
				fs::write(&outputPath, &bytes)
					.map_err(|source| Error::Create { path: outputPath.clone(), source })?;
				bytes.len()
			};
			debug!("{framePath:?} -> {outputPath:?} ({:?}, {size} bytes)", wte.imageType);
			let wte::Metadata { imageType, width, height, numColors, .. } = wte.metadata();
			manifest.frame.push(ManifestEntry {
				index,
				source: framePath,
				output: outputPath,
				imageType,
				width,
				height,
				numColors,
				size,
			});
		}
		if manifest.frame.is_empty() {
			warn!("no frames converted");
		}
		info!("wte conversion done ({} frames)", manifest.frame.len());
		Ok(manifest)
	}

}

/// SVG path data into `DrawingInfo` arrays.
pub mod drawing {
	use {
		const_format::concatcp,
		core::iter,
		glam::DVec2,
		std::io::{self, Write},
	};

	pub const COORD_MIN: i32 = 2;
	pub const COORD_MAX: i32 = 254;
	pub const DEFAULT_ARRAY_NAME: &str = "test_drawing_info";
	const COMMAND_PREFIX: &str = "DRAWING_COMMAND_";
	pub const PEN_DOWN: &str = concatcp!(COMMAND_PREFIX, "PEN_DOWN");
	pub const PEN_UP: &str = concatcp!(COMMAND_PREFIX, "PEN_UP");
	pub const END: &str = concatcp!(COMMAND_PREFIX, "END");

	#[derive(Debug, thiserror::Error)]
	pub enum Error {
		#[error("SVG parsing failed: {0}")]
		Xml(#[from] roxmltree::Error),
		#[error("path {0:?} has no `d` attribute")]
		MissingPathData(String),
		#[error("{0:?} is not an `x,y` point")]
		BadPoint(String),
		#[error("path command {0:?} is not supported")]
		UnsupportedCommand(String),
	}

	#[derive(Clone, Copy, Debug, PartialEq, Eq)]
	pub enum Command {
		PenDown { x: i32, y: i32 },
		PenUp { x: i32, y: i32 },
		End,
	}

	#[derive(Clone, Copy, Debug, PartialEq, Eq)]
	pub enum ScanState {
		Init,
		MoveAbsolute,
		CurveRelative,
		CurveAbsolute,
		Closed,
	}

	impl ScanState {
		fn fromToken(token: &str) -> Option<Self> {
			Some(match token {
				"m" => Self::MoveAbsolute,
				"c" => Self::CurveRelative,
				"C" => Self::CurveAbsolute,
				"z" => Self::Closed,
				_ => return None,
			})
		}
	}

	fn inRange(coord: i32) -> bool {
		(COORD_MIN..=COORD_MAX).contains(&coord)
	}

	fn parsePoint(token: &str) -> Result<DVec2, Error> {
		let badPoint = || Error::BadPoint(token.to_owned());
		let (x, y) = token.split_once(',').ok_or_else(badPoint)?;
		Ok(DVec2::new(x.parse().map_err(|_| badPoint())?, y.parse().map_err(|_| badPoint())?))
	}

	/// Appends the pen-down points of one path, then its closing pen-up.
	pub fn scanPath(d: &str, commands: &mut Vec<Command>) -> Result<(), Error> {
		let (mut state, mut pen, mut lastValid) = (ScanState::Init, DVec2::ZERO, [0, 0]);
		for token in d.split_whitespace() {
			if let Some(next) = ScanState::fromToken(token) {
				state = next;
				continue;
			}
			pen = match state {
				ScanState::Init | ScanState::Closed => continue,
				_ if token.len() == 1 && token.as_bytes()[0].is_ascii_alphabetic() => {
					return Err(Error::UnsupportedCommand(token.to_owned()));
				}
				ScanState::MoveAbsolute | ScanState::CurveAbsolute => parsePoint(token)?,
				ScanState::CurveRelative => pen + parsePoint(token)?,
			};
			// positions keep moving even when the point itself is dropped
			let [x, y] = pen.to_array().map(|coord| coord.trunc() as i32);
			if inRange(x) && inRange(y) {
				commands.push(Command::PenDown { x, y });
				lastValid = [x, y];
			}
		}
		commands.push(Command::PenUp { x: lastValid[0], y: lastValid[1] });
		Ok(())
	}

	pub fn commandsFromSVG(svg: &str) -> Result<Vec<Command>, Error> {
		let (document, mut commands) = (roxmltree::Document::parse(svg)?, Vec::new());
		for node in document.descendants().filter(|node| node.is_element() && node.tag_name().name() == "path") {
			let d = node
				.attribute("d")
				.ok_or_else(|| Error::MissingPathData(node.attribute("id").unwrap_or_default().to_owned()))?;
			scanPath(d, &mut commands)?;
		}
		Ok(commands)
	}

	pub fn isCIdentifier(name: &str) -> bool {
		let mut chars = name.chars();
		chars.next().map_or(false, |first| first.is_ascii_alphabetic() || first == '_')
			&& chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
	}

	/// `End` entries in `commands` are skipped; exactly one terminates the array.
	pub fn writeDrawingInfo(name: &str, commands: &[Command], writer: &mut impl Write) -> io::Result<()> {
		let body = commands.iter().filter(|&&command| command != Command::End);
		writeln!(writer, "struct DrawingInfo {name}[{}] = {{", body.clone().count() + 1)?;
		for &command in body.chain(iter::once(&Command::End)) {
			match command {
				Command::PenDown { x, y } | Command::PenUp { x, y } => {
					let kind = if let Command::PenDown { .. } = command { PEN_DOWN } else { PEN_UP };
					write!(writer, "    {{\n        {kind},\n        {x}, {y}\n    }},\n")?;
				}
				Command::End => writeln!(writer, "    {{ {END}, 0, 0 }}")?,
			}
		}
		writeln!(writer, "}};")
	}

}

use {
	log::LevelFilter,
	serde::Serialize,
	simple_logger::SimpleLogger,
	std::{
		fs::File,
		io::{self, Read},
	},
};

#[cfg(unix)]
pub fn stdoutRaw() -> File {
	use std::os::unix::io::FromRawFd;
	unsafe { File::from_raw_fd(1) }
}

#[cfg(windows)]
pub fn stdoutRaw() -> File {
	use std::os::windows::io::{AsRawHandle, FromRawHandle};
	unsafe { File::from_raw_handle(io::stdout().as_raw_handle()) }
}

pub fn io_readToString(mut reader: impl Read) -> io::Result<String> {
	let mut string = String::new();
	reader.read_to_string(&mut string)?;
	Ok(string)
}

pub fn toml_toStringPretty<T: Serialize + ?Sized>(value: &T) -> Result<String, toml::ser::Error> {
	toml::to_string_pretty(value)
}

/// Verbosity flags shared by every converter.
#[derive(clap::Args, Debug, Default)]
pub struct LogArgs {
	/// More log output; repeat for more
	#[clap(short, long, parse(from_occurrences))]
	pub verbose: u8,
	/// Errors only
	#[clap(short, long, conflicts_with = "verbose")]
	pub quiet: bool,
}

impl LogArgs {
	pub fn levelFilter(&self) -> LevelFilter {
		if self.quiet {
			return LevelFilter::Error;
		}
		match self.verbose {
			0 => LevelFilter::Warn,
			1 => LevelFilter::Info,
			2 => LevelFilter::Debug,
			_ => LevelFilter::Trace,
		}
	}
}

/// Logs go to stderr; `RUST_LOG` overrides the flags.
pub fn initLogger(args: &LogArgs) {
	if let Err(err) = SimpleLogger::new().with_level(args.levelFilter()).env().init() {
		eprintln!("logger: {err}");
	}
}
