//! Type tables for parts and elements
//!
//! Maps content types to part class names and (namespace, local name) pairs
//! to element class names, following the Open XML SDK naming. The tables
//! cover the common WordprocessingML, SpreadsheetML, PresentationML and
//! DrawingML vocabulary; everything else falls back to
//! `ExtendedPart` / `OpenXmlUnknownElement`.

/// WordprocessingML main namespace
pub const NS_WORDPROCESSING: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
/// SpreadsheetML main namespace
pub const NS_SPREADSHEET: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
/// PresentationML main namespace
pub const NS_PRESENTATION: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
/// DrawingML main namespace
pub const NS_DRAWING: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

/// Type name reported for parts missing from the part table
pub const EXTENDED_PART_TYPE: &str = "ExtendedPart";

/// An SDK namespace that generated code imports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SdkNamespace {
    /// Fully qualified namespace (`DocumentFormat.OpenXml.Wordprocessing`)
    pub name: &'static str,
    /// Short alias used when aliasing is enabled (`W`)
    pub alias: &'static str,
}

/// `DocumentFormat.OpenXml.Wordprocessing`
pub const SDK_WORDPROCESSING: SdkNamespace = SdkNamespace {
    name: "DocumentFormat.OpenXml.Wordprocessing",
    alias: "W",
};
/// `DocumentFormat.OpenXml.Spreadsheet`
pub const SDK_SPREADSHEET: SdkNamespace = SdkNamespace {
    name: "DocumentFormat.OpenXml.Spreadsheet",
    alias: "X",
};
/// `DocumentFormat.OpenXml.Presentation`
pub const SDK_PRESENTATION: SdkNamespace = SdkNamespace {
    name: "DocumentFormat.OpenXml.Presentation",
    alias: "P",
};
/// `DocumentFormat.OpenXml.Drawing`
pub const SDK_DRAWING: SdkNamespace = SdkNamespace {
    name: "DocumentFormat.OpenXml.Drawing",
    alias: "A",
};

/// A known element class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementClass {
    /// Class name (`Paragraph`)
    pub name: &'static str,
    /// Namespace the class lives in
    pub sdk_namespace: SdkNamespace,
    /// Leaf element whose content is plain text (`Text`, `CellValue`)
    pub leaf_text: bool,
}

const fn class(name: &'static str, sdk_namespace: SdkNamespace) -> ElementClass {
    ElementClass {
        name,
        sdk_namespace,
        leaf_text: false,
    }
}

const fn leaf(name: &'static str, sdk_namespace: SdkNamespace) -> ElementClass {
    ElementClass {
        name,
        sdk_namespace,
        leaf_text: true,
    }
}

static WORDPROCESSING: &[(&str, ElementClass)] = &[
    ("document", class("Document", SDK_WORDPROCESSING)),
    ("body", class("Body", SDK_WORDPROCESSING)),
    ("p", class("Paragraph", SDK_WORDPROCESSING)),
    ("pPr", class("ParagraphProperties", SDK_WORDPROCESSING)),
    ("pStyle", class("ParagraphStyleId", SDK_WORDPROCESSING)),
    ("numPr", class("NumberingProperties", SDK_WORDPROCESSING)),
    ("r", class("Run", SDK_WORDPROCESSING)),
    ("rPr", class("RunProperties", SDK_WORDPROCESSING)),
    ("rStyle", class("RunStyle", SDK_WORDPROCESSING)),
    ("b", class("Bold", SDK_WORDPROCESSING)),
    ("i", class("Italic", SDK_WORDPROCESSING)),
    ("u", class("Underline", SDK_WORDPROCESSING)),
    ("t", leaf("Text", SDK_WORDPROCESSING)),
    ("instrText", leaf("FieldCode", SDK_WORDPROCESSING)),
    ("br", class("Break", SDK_WORDPROCESSING)),
    ("tab", class("TabChar", SDK_WORDPROCESSING)),
    ("hyperlink", class("Hyperlink", SDK_WORDPROCESSING)),
    ("bookmarkStart", class("BookmarkStart", SDK_WORDPROCESSING)),
    ("bookmarkEnd", class("BookmarkEnd", SDK_WORDPROCESSING)),
    ("tbl", class("Table", SDK_WORDPROCESSING)),
    ("tblPr", class("TableProperties", SDK_WORDPROCESSING)),
    ("tblGrid", class("TableGrid", SDK_WORDPROCESSING)),
    ("gridCol", class("GridColumn", SDK_WORDPROCESSING)),
    ("tr", class("TableRow", SDK_WORDPROCESSING)),
    ("tc", class("TableCell", SDK_WORDPROCESSING)),
    ("sectPr", class("SectionProperties", SDK_WORDPROCESSING)),
    ("pgSz", class("PageSize", SDK_WORDPROCESSING)),
    ("pgMar", class("PageMargin", SDK_WORDPROCESSING)),
    ("styles", class("Styles", SDK_WORDPROCESSING)),
    ("style", class("Style", SDK_WORDPROCESSING)),
    ("settings", class("Settings", SDK_WORDPROCESSING)),
    ("fonts", class("Fonts", SDK_WORDPROCESSING)),
    ("font", class("Font", SDK_WORDPROCESSING)),
    ("numbering", class("Numbering", SDK_WORDPROCESSING)),
    ("hdr", class("Header", SDK_WORDPROCESSING)),
    ("ftr", class("Footer", SDK_WORDPROCESSING)),
];

static SPREADSHEET: &[(&str, ElementClass)] = &[
    ("workbook", class("Workbook", SDK_SPREADSHEET)),
    ("bookViews", class("BookViews", SDK_SPREADSHEET)),
    ("workbookView", class("WorkbookView", SDK_SPREADSHEET)),
    ("sheets", class("Sheets", SDK_SPREADSHEET)),
    ("sheet", class("Sheet", SDK_SPREADSHEET)),
    ("worksheet", class("Worksheet", SDK_SPREADSHEET)),
    ("dimension", class("SheetDimension", SDK_SPREADSHEET)),
    ("sheetViews", class("SheetViews", SDK_SPREADSHEET)),
    ("sheetView", class("SheetView", SDK_SPREADSHEET)),
    ("sheetFormatPr", class("SheetFormatProperties", SDK_SPREADSHEET)),
    ("cols", class("Columns", SDK_SPREADSHEET)),
    ("col", class("Column", SDK_SPREADSHEET)),
    ("sheetData", class("SheetData", SDK_SPREADSHEET)),
    ("row", class("Row", SDK_SPREADSHEET)),
    ("c", class("Cell", SDK_SPREADSHEET)),
    ("v", leaf("CellValue", SDK_SPREADSHEET)),
    ("f", leaf("CellFormula", SDK_SPREADSHEET)),
    ("is", class("InlineString", SDK_SPREADSHEET)),
    ("mergeCells", class("MergeCells", SDK_SPREADSHEET)),
    ("mergeCell", class("MergeCell", SDK_SPREADSHEET)),
    ("pageMargins", class("PageMargins", SDK_SPREADSHEET)),
    ("sst", class("SharedStringTable", SDK_SPREADSHEET)),
    ("si", class("SharedStringItem", SDK_SPREADSHEET)),
    ("t", leaf("Text", SDK_SPREADSHEET)),
    ("styleSheet", class("Stylesheet", SDK_SPREADSHEET)),
];

static PRESENTATION: &[(&str, ElementClass)] = &[
    ("presentation", class("Presentation", SDK_PRESENTATION)),
    ("sldMasterIdLst", class("SlideMasterIdList", SDK_PRESENTATION)),
    ("sldMasterId", class("SlideMasterId", SDK_PRESENTATION)),
    ("sldIdLst", class("SlideIdList", SDK_PRESENTATION)),
    ("sldId", class("SlideId", SDK_PRESENTATION)),
    ("sldSz", class("SlideSize", SDK_PRESENTATION)),
    ("notesSz", class("NotesSize", SDK_PRESENTATION)),
    ("sld", class("Slide", SDK_PRESENTATION)),
    ("sldLayout", class("SlideLayout", SDK_PRESENTATION)),
    ("sldMaster", class("SlideMaster", SDK_PRESENTATION)),
    ("cSld", class("CommonSlideData", SDK_PRESENTATION)),
    ("spTree", class("ShapeTree", SDK_PRESENTATION)),
    ("sp", class("Shape", SDK_PRESENTATION)),
    ("txBody", class("TextBody", SDK_PRESENTATION)),
];

static DRAWING: &[(&str, ElementClass)] = &[
    ("p", class("Paragraph", SDK_DRAWING)),
    ("r", class("Run", SDK_DRAWING)),
    ("t", leaf("Text", SDK_DRAWING)),
    ("bodyPr", class("BodyProperties", SDK_DRAWING)),
    ("lstStyle", class("ListStyle", SDK_DRAWING)),
    ("theme", class("Theme", SDK_DRAWING)),
];

/// Look up the element class for a namespace and local name
pub fn element_class(namespace: &str, local: &str) -> Option<&'static ElementClass> {
    let table = match namespace {
        NS_WORDPROCESSING => WORDPROCESSING,
        NS_SPREADSHEET => SPREADSHEET,
        NS_PRESENTATION => PRESENTATION,
        NS_DRAWING => DRAWING,
        _ => return None,
    };
    table
        .iter()
        .find(|(name, _)| *name == local)
        .map(|(_, class)| class)
}

/// A known part class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartClass {
    /// Class name (`MainDocumentPart`)
    pub name: &'static str,
    /// Content types this class is registered for
    pub content_types: &'static [&'static str],
}

static PART_CLASSES: &[PartClass] = &[
    PartClass {
        name: "MainDocumentPart",
        content_types: &[
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.template.main+xml",
            "application/vnd.ms-word.document.macroEnabled.main+xml",
            "application/vnd.ms-word.template.macroEnabledTemplate.main+xml",
        ],
    },
    PartClass {
        name: "StyleDefinitionsPart",
        content_types: &["application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"],
    },
    PartClass {
        name: "DocumentSettingsPart",
        content_types: &["application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml"],
    },
    PartClass {
        name: "FontTablePart",
        content_types: &["application/vnd.openxmlformats-officedocument.wordprocessingml.fontTable+xml"],
    },
    PartClass {
        name: "WebSettingsPart",
        content_types: &["application/vnd.openxmlformats-officedocument.wordprocessingml.webSettings+xml"],
    },
    PartClass {
        name: "NumberingDefinitionsPart",
        content_types: &["application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"],
    },
    PartClass {
        name: "HeaderPart",
        content_types: &["application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml"],
    },
    PartClass {
        name: "FooterPart",
        content_types: &["application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml"],
    },
    PartClass {
        name: "FootnotesPart",
        content_types: &["application/vnd.openxmlformats-officedocument.wordprocessingml.footnotes+xml"],
    },
    PartClass {
        name: "EndnotesPart",
        content_types: &["application/vnd.openxmlformats-officedocument.wordprocessingml.endnotes+xml"],
    },
    PartClass {
        name: "WordprocessingCommentsPart",
        content_types: &["application/vnd.openxmlformats-officedocument.wordprocessingml.comments+xml"],
    },
    PartClass {
        name: "WorkbookPart",
        content_types: &[
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml",
            "application/vnd.openxmlformats-officedocument.spreadsheetml.template.main+xml",
            "application/vnd.ms-excel.sheet.macroEnabled.main+xml",
        ],
    },
    PartClass {
        name: "WorksheetPart",
        content_types: &["application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"],
    },
    PartClass {
        name: "SharedStringTablePart",
        content_types: &["application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"],
    },
    PartClass {
        name: "WorkbookStylesPart",
        content_types: &["application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"],
    },
    PartClass {
        name: "CalculationChainPart",
        content_types: &["application/vnd.openxmlformats-officedocument.spreadsheetml.calcChain+xml"],
    },
    PartClass {
        name: "PresentationPart",
        content_types: &[
            "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml",
            "application/vnd.openxmlformats-officedocument.presentationml.template.main+xml",
            "application/vnd.ms-powerpoint.presentation.macroEnabled.main+xml",
        ],
    },
    PartClass {
        name: "SlidePart",
        content_types: &["application/vnd.openxmlformats-officedocument.presentationml.slide+xml"],
    },
    PartClass {
        name: "SlideLayoutPart",
        content_types: &["application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"],
    },
    PartClass {
        name: "SlideMasterPart",
        content_types: &["application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"],
    },
    PartClass {
        name: "NotesSlidePart",
        content_types: &["application/vnd.openxmlformats-officedocument.presentationml.notesSlide+xml"],
    },
    PartClass {
        name: "PresentationPropertiesPart",
        content_types: &["application/vnd.openxmlformats-officedocument.presentationml.presProps+xml"],
    },
    PartClass {
        name: "ViewPropertiesPart",
        content_types: &["application/vnd.openxmlformats-officedocument.presentationml.viewProps+xml"],
    },
    PartClass {
        name: "TableStylesPart",
        content_types: &["application/vnd.openxmlformats-officedocument.presentationml.tableStyles+xml"],
    },
    PartClass {
        name: "ThemePart",
        content_types: &["application/vnd.openxmlformats-officedocument.theme+xml"],
    },
    PartClass {
        name: "CoreFilePropertiesPart",
        content_types: &["application/vnd.openxmlformats-package.core-properties+xml"],
    },
    PartClass {
        name: "ExtendedFilePropertiesPart",
        content_types: &["application/vnd.openxmlformats-officedocument.extended-properties+xml"],
    },
    PartClass {
        name: "CustomFilePropertiesPart",
        content_types: &["application/vnd.openxmlformats-officedocument.custom-properties+xml"],
    },
];

/// Look up the part class registered for a content type
///
/// Any `image/*` content type maps to `ImagePart`.
pub fn part_class(content_type: &str) -> Option<&'static PartClass> {
    static IMAGE_PART: PartClass = PartClass {
        name: "ImagePart",
        content_types: &[],
    };

    if content_type.starts_with("image/") {
        return Some(&IMAGE_PART);
    }
    PART_CLASSES
        .iter()
        .find(|class| class.content_types.iter().any(|ct| *ct == content_type))
}

/// Part type name for a content type (`ExtendedPart` when unknown)
pub fn part_type_name(content_type: &str) -> &'static str {
    part_class(content_type).map_or(EXTENDED_PART_TYPE, |c| c.name)
}

/// Check whether parts of this content type carry XML
pub fn is_xml_content_type(content_type: &str) -> bool {
    content_type.ends_with("+xml") || content_type == "application/xml" || content_type == "text/xml"
}
